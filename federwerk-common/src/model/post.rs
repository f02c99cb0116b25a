use crate::model::Id;
use crate::model::user::{User, UserMarker};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::{
    UtcDateTime,
    format_description::BorrowedFormatItem,
    macros::format_description,
};

pub const TITLE_MAX_LEN: usize = 30;
pub const BODY_MAX_LEN: usize = 1000;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[day]/[month]/[year]");

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub date: PostDate,
    pub title: String,
    pub body: String,
    pub author: User,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreatePost {
    pub date: PostDate,
    pub title: String,
    pub body: String,
    pub author: Id<UserMarker>,
}

/// Creation date in `day/month/year` form, stored as text.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostDate(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post date is invalid: {0}")]
pub struct InvalidPostDateError(String);

impl PostDate {
    pub fn new(date: String) -> Result<Self, InvalidPostDateError> {
        match time::Date::parse(&date, DATE_FORMAT) {
            Ok(_) => Ok(PostDate(date)),
            Err(_) => Err(InvalidPostDateError(date)),
        }
    }

    /// Stamps the given instant in `dd/mm/yyyy` form.
    pub fn stamp(now: UtcDateTime) -> Result<Self, time::error::Format> {
        now.date().format(DATE_FORMAT).map(PostDate)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PostDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PostDate::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"PostDate"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::utc_datetime;

    #[test]
    fn stamp_formats_day_month_year() {
        let date = PostDate::stamp(utc_datetime!(2024-02-05 13:37)).unwrap();
        assert_eq!(date.get(), "05/02/2024");
    }

    #[test]
    fn new_rejects_garbage() {
        assert!(PostDate::new("yesterday".into()).is_err());
        assert!(PostDate::new("32/01/2024".into()).is_err());
        assert!(PostDate::new("05/02/2024".into()).is_ok());
    }
}
