use crate::server::{Key, ServerError};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::SignedCookieJar;
use federwerk_common::model::{
    Id,
    auth::{SessionToken, SessionTokenHash},
    user::UserMarker,
};
use federwerk_db::client::DbClient;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session";

/// Route-level authentication requirement. A handler that takes this
/// extractor can only run with a valid session; everything else is
/// redirected to the login page by the rejection.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser {
    id: Id<UserMarker>,
    token_hash: SessionTokenHash,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(&self) -> Id<UserMarker> {
        self.id
    }

    /// Hash of the presented token, so logout can delete exactly the
    /// session that authenticated this request.
    #[must_use]
    pub fn token_hash(&self) -> &SessionTokenHash {
        &self.token_hash
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(infallible) => match infallible {},
        };

        let cookie = jar.get(SESSION_COOKIE).ok_or(ServerError::Unauthenticated)?;
        let request_token: SessionToken = cookie.value().parse()?;

        let token_hash = request_token.hash()?;

        let session = Arc::<DbClient>::from_ref(state)
            .fetch_session(&token_hash)
            .await?
            .ok_or(ServerError::Unauthenticated)?;

        if session.user != request_token.user_id {
            return Err(ServerError::Unauthenticated);
        }

        Ok(Self {
            id: session.user,
            token_hash,
        })
    }
}
