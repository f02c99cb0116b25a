use crate::server::{
    Result, ServerError, ServerRouter,
    auth::{AuthenticatedUser, SESSION_COOKIE},
    flash,
    form::Form,
    views,
};
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::Cookie;
use axum_extra::routing::{RouterExt, TypedPath};
use federwerk_common::forms::{LoginForm, RegisterForm};
use federwerk_common::model::auth::{HashedPassword, Session, SessionToken};
use federwerk_common::model::user::{CreateUser, Email, UserMarker};
use federwerk_common::model::Id;
use federwerk_common::names::generate_name;
use federwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::UtcDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(login_page)
        .typed_post(login_submit)
        .typed_get(register_page)
        .typed_post(register_submit)
        .typed_get(logout)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/login", rejection(ServerError))]
struct LoginPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/register", rejection(ServerError))]
struct RegisterPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/logout", rejection(ServerError))]
struct LogoutPath();

#[derive(Serialize)]
struct LoginView {
    email: String,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct RegisterView {
    email: String,
    age: String,
    messages: Vec<String>,
}

async fn login_page(
    LoginPath(): LoginPath,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response)> {
    let (jar, messages) = flash::take(jar);
    let page = views::render(
        "login",
        &LoginView {
            email: String::new(),
            messages,
        },
    )?;

    Ok((jar, page.into_response()))
}

async fn login_submit(
    LoginPath(): LoginPath,
    State(db): State<Arc<DbClient>>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let page = views::render(
            "login",
            &LoginView {
                email: form.email,
                messages: errors.iter().map(ToString::to_string).collect(),
            },
        )?;
        return Ok(page.into_response());
    }

    // A malformed address cannot belong to an account; same generic
    // failure as a wrong password, to keep login responses uniform.
    let Ok(email) = Email::new(form.email.clone()) else {
        return failed_login(jar);
    };

    let Some((user, password)) = db.fetch_user_by_email(&email).await? else {
        return failed_login(jar);
    };

    if !password.verify(&form.password)? {
        return failed_login(jar);
    }

    db.update_username(user.id, &generate_name()).await?;

    let jar = establish_session(&db, jar, user.id).await?;
    Ok((jar, Redirect::to("/feed-page")).into_response())
}

fn failed_login(jar: SignedCookieJar) -> Result<Response> {
    let jar = flash::push(jar, "Please check your login details and try again.");
    Ok((jar, Redirect::to("/login")).into_response())
}

async fn register_page(
    RegisterPath(): RegisterPath,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response)> {
    let (jar, messages) = flash::take(jar);
    let page = views::render(
        "register",
        &RegisterView {
            email: String::new(),
            age: String::new(),
            messages,
        },
    )?;

    Ok((jar, page.into_response()))
}

async fn register_submit(
    RegisterPath(): RegisterPath,
    State(db): State<Arc<DbClient>>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let messages = errors.iter().map(ToString::to_string).collect();
        return rerender_register(&form, messages);
    }

    let Ok(age) = form.age.trim().parse::<i64>() else {
        return rerender_register(&form, vec!["Age must be a number!".into()]);
    };

    let Ok(email) = Email::new(form.email.clone()) else {
        return rerender_register(&form, vec!["Invalid email address.".into()]);
    };

    // Compared as submitted; the stored hash plays no part here.
    if form.password != form.password_confirm {
        return rerender_register(&form, vec!["Passwords do not match!".into()]);
    }

    if db.fetch_user_by_email(&email).await?.is_some() {
        let jar = flash::push(
            jar,
            "You've already signed up with that e-mail, log in instead!",
        );
        return Ok((jar, Redirect::to("/login")).into_response());
    }

    let password = HashedPassword::hash(&form.password)?;
    let user_id = db
        .create_user(&CreateUser {
            username: generate_name(),
            email,
            age,
            password,
        })
        .await?;

    let jar = establish_session(&db, jar, user_id).await?;
    Ok((jar, Redirect::to("/feed-page")).into_response())
}

fn rerender_register(form: &RegisterForm, messages: Vec<String>) -> Result<Response> {
    let page = views::render(
        "register",
        &RegisterView {
            email: form.email.clone(),
            age: form.age.clone(),
            messages,
        },
    )?;

    Ok(page.into_response())
}

async fn logout(
    LogoutPath(): LogoutPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect)> {
    db.delete_session(user.token_hash()).await?;

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, Redirect::to("/")))
}

/// Creates a session row and plants the token cookie. The cookie carries
/// no max-age, so it does not survive a browser restart.
async fn establish_session(
    db: &DbClient,
    jar: SignedCookieJar,
    user_id: Id<UserMarker>,
) -> Result<SignedCookieJar> {
    let token = SessionToken::generate_random(user_id);
    let session = Session {
        user: user_id,
        token_hash: token.hash()?,
        created_at: UtcDateTime::now(),
    };

    db.create_session(&session).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.as_cookie_value()))
        .path("/")
        .http_only(true)
        .build();
    Ok(jar.add(cookie))
}
