//! Rendering seam: a handler hands over a view name and a serializable
//! data bag. The HTML shell around the bag is deliberately minimal; the
//! page structure itself is out of scope.

use axum::http::StatusCode;
use axum::response::Html;
use serde::Serialize;

pub fn render<T: Serialize>(view: &str, data: &T) -> Result<Html<String>, serde_json::Error> {
    let bag = serde_json::to_string(data)?;

    Ok(Html(format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"><title>Federwerk</title></head>\
         <body data-view=\"{view}\">\
         <script id=\"view-data\" type=\"application/json\">{bag}</script>\
         </body></html>"
    )))
}

#[must_use]
pub fn error_page(status: StatusCode) -> Html<String> {
    let reason = status.canonical_reason().unwrap_or("Error");

    Html(format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"><title>{status}</title></head>\
         <body data-view=\"error\"><h1>{code} {reason}</h1></body></html>",
        code = status.as_u16(),
    ))
}
