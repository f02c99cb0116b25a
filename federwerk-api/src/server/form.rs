use crate::server::ServerError;
use axum::{Form as AxumForm, extract::FromRequest};

/// Form extractor whose rejection flows through [`ServerError`].
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumForm), rejection(ServerError))]
pub struct Form<T>(pub T);
