use crate::server::{
    Result, ServerError, ServerRouter, auth::AuthenticatedUser, flash, form::Form, views,
};
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use axum_extra::routing::{RouterExt, TypedPath};
use federwerk_common::forms::CreatePostForm;
use federwerk_common::model::Id;
use federwerk_common::model::post::{CreatePost, Post, PostDate, PostMarker};
use federwerk_common::names::generate_name;
use federwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::UtcDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(feed_page)
        .typed_get(new_post_page)
        .typed_post(new_post_submit)
        .typed_get(delete_post)
        .typed_get(profile)
        .typed_get(change_name)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/feed-page", rejection(ServerError))]
struct FeedPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/new-post", rejection(ServerError))]
struct NewPostPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/delete-post/{id}", rejection(ServerError))]
struct DeletePostPath {
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile", rejection(ServerError))]
struct ProfilePath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/change-name", rejection(ServerError))]
struct ChangeNamePath();

#[derive(Serialize)]
struct FeedView {
    posts: Vec<Post>,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct NewPostView {
    title: String,
    body: String,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct ProfileView {
    user_posts: Vec<Post>,
    messages: Vec<String>,
}

async fn feed_page(
    FeedPath(): FeedPath,
    _user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>)> {
    let posts = db.fetch_posts().await?;

    let (jar, messages) = flash::take(jar);
    let page = views::render("feed", &FeedView { posts, messages })?;

    Ok((jar, page))
}

async fn new_post_page(
    NewPostPath(): NewPostPath,
    _user: AuthenticatedUser,
) -> Result<Html<String>> {
    let page = views::render(
        "new_post",
        &NewPostView {
            title: String::new(),
            body: String::new(),
            messages: Vec::new(),
        },
    )?;

    Ok(page)
}

async fn new_post_submit(
    NewPostPath(): NewPostPath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
    Form(form): Form<CreatePostForm>,
) -> Result<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let page = views::render(
            "new_post",
            &NewPostView {
                title: form.title,
                body: form.body,
                messages: errors.iter().map(ToString::to_string).collect(),
            },
        )?;
        return Ok(page.into_response());
    }

    db.create_post(&CreatePost {
        date: PostDate::stamp(UtcDateTime::now())?,
        title: form.title,
        body: form.body,
        author: user.user_id(),
    })
    .await?;

    Ok(Redirect::to("/feed-page").into_response())
}

/// Only the author may delete a post; a missing id is a clean not-found.
async fn delete_post(
    DeletePostPath { id }: DeletePostPath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Redirect> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    if post.author.id != user.user_id() {
        return Err(ServerError::NotPostAuthor(id));
    }

    db.delete_post(id).await?;

    Ok(Redirect::to("/feed-page"))
}

async fn profile(
    ProfilePath(): ProfilePath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>)> {
    let user_posts = db.fetch_user_posts(user.user_id()).await?;

    let (jar, messages) = flash::take(jar);
    let page = views::render("profile", &ProfileView { user_posts, messages })?;

    Ok((jar, page))
}

async fn change_name(
    ChangeNamePath(): ChangeNamePath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Redirect> {
    db.update_username(user.user_id(), &generate_name()).await?;

    Ok(Redirect::to("/profile"))
}
