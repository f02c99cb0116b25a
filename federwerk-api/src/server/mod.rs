use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use federwerk_common::model::{
    Id,
    auth::{PasswordHashError, SessionTokenDecodeError, SessionTokenHashError},
    post::PostMarker,
};
use federwerk_db::client::{DbClient, DbError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

pub mod auth;
pub mod flash;
mod form;
mod routes;
mod views;

pub type ServerRouter = Router<ServerState>;

pub type Key = axum_extra::extract::cookie::Key;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub cookie_key: Key,
    pub http_client: reqwest::Client,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming form rejected: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("No authenticated session")]
    Unauthenticated,
    #[error("The session cookie could not be decoded: {0}")]
    InvalidSessionCookie(#[from] SessionTokenDecodeError),
    #[error("The session token could not be hashed: {0}")]
    SessionTokenHash(#[from] SessionTokenHashError),
    #[error("The password could not be hashed: {0}")]
    PasswordHash(#[from] PasswordHashError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Post with id {0} belongs to another user.")]
    NotPostAuthor(Id<PostMarker>),
    #[error("The view data could not be serialized: {0}")]
    ViewData(#[from] serde_json::Error),
    #[error("Formatting the post date failed: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ServerError {
    /// Whether the failure means "no valid session": those are answered
    /// with a redirect to the login page instead of an error page.
    #[must_use]
    pub fn wants_login(&self) -> bool {
        matches!(
            self,
            ServerError::Unauthenticated | ServerError::InvalidSessionCookie(_)
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unauthenticated | ServerError::InvalidSessionCookie(_) => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::NotPostAuthor(_) => StatusCode::FORBIDDEN,
            ServerError::FormRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::SessionTokenHash(_)
            | ServerError::PasswordHash(_)
            | ServerError::ViewData(_)
            | ServerError::DateFormat(_)
            | ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.wants_login() {
            debug!(error = %self, "Redirecting unauthenticated request to login");
            return Redirect::to("/login").into_response();
        }

        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        (status, views::error_page(status)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_redirects_instead_of_erroring() {
        assert!(ServerError::Unauthenticated.wants_login());

        let response = ServerError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/login"
        );
    }

    #[test]
    fn missing_post_maps_to_not_found() {
        let error = ServerError::PostByIdNotFound(Id::new(42));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn foreign_post_maps_to_forbidden() {
        let error = ServerError::NotPostAuthor(Id::new(42));
        assert_eq!(error.status(), StatusCode::FORBIDDEN);
    }
}
