use crate::server::ServerRouter;
use axum::Router;

mod auth;
mod landing;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(landing::routes())
        .merge(auth::routes())
        .merge(posts::routes())
}
