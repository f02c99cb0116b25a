//! Input-shape validation for the three submitted forms. Pure string
//! checks, independent of persistence; the numeric age check and the
//! password-confirmation check belong to the register handler.

use crate::model::user::{EMAIL_MAX_LEN, EMAIL_MIN_LEN, has_email_shape};
use crate::model::post::{BODY_MAX_LEN, TITLE_MAX_LEN};
use serde::Deserialize;
use std::fmt::{Display, Formatter};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 40;
pub const AGE_MAX_LEN: usize = 3;

/// A single violation, carrying the label of the offending field.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct FieldError {
    pub label: &'static str,
    pub message: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in the {} field - {}", self.label, self.message)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub age: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct CreatePostForm {
    pub title: String,
    pub body: String,
}

impl RegisterForm {
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        email_field("E-mail*", &self.email, &mut errors);

        // Age stays textual here; the register handler parses it.
        required("Age*", &self.age, &mut errors);
        length_between("Age*", &self.age, 1, AGE_MAX_LEN, &mut errors);

        required("Password (min. 6 characters)", &self.password, &mut errors);
        length_between(
            "Password (min. 6 characters)",
            &self.password,
            PASSWORD_MIN_LEN,
            PASSWORD_MAX_LEN,
            &mut errors,
        );

        required(
            "Confirm Password (min. 6 characters)",
            &self.password_confirm,
            &mut errors,
        );
        length_between(
            "Confirm Password (min. 6 characters)",
            &self.password_confirm,
            PASSWORD_MIN_LEN,
            PASSWORD_MAX_LEN,
            &mut errors,
        );

        errors
    }
}

impl LoginForm {
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        email_field("E-mail", &self.email, &mut errors);

        required("Password", &self.password, &mut errors);
        length_between("Password", &self.password, 0, PASSWORD_MAX_LEN, &mut errors);

        errors
    }
}

impl CreatePostForm {
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        required("Title", &self.title, &mut errors);
        length_between("Title", &self.title, 0, TITLE_MAX_LEN, &mut errors);

        required("Content", &self.body, &mut errors);
        length_between("Content", &self.body, 0, BODY_MAX_LEN, &mut errors);

        errors
    }
}

fn required(label: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError {
            label,
            message: "This field is required.".into(),
        });
    }
}

fn email_field(label: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    required(label, value, errors);

    if !value.is_empty() && !has_email_shape(value) {
        errors.push(FieldError {
            label,
            message: "Invalid email address.".into(),
        });
    }

    length_between(label, value, EMAIL_MIN_LEN, EMAIL_MAX_LEN, errors);
}

fn length_between(
    label: &'static str,
    value: &str,
    min: usize,
    max: usize,
    errors: &mut Vec<FieldError>,
) {
    // Empty values are reported by `required` alone.
    if value.is_empty() {
        return;
    }

    let len = value.chars().count();
    if len < min || len > max {
        let message = if min > 0 {
            format!("Field must be between {min} and {max} characters long.")
        } else {
            format!("Field cannot be longer than {max} characters.")
        };
        errors.push(FieldError { label, message });
    }
}
