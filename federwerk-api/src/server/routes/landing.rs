use crate::server::{Result, ServerError, ServerRouter, flash, views};
use axum::extract::State;
use axum::response::Html;
use axum_extra::extract::SignedCookieJar;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use tracing::warn;

const QUOTE_URL: &str = "https://api.quotable.io/random?tags=wisdom";

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(index)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
struct IndexPath();

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
struct Quote {
    content: String,
    #[serde(default)]
    author: Option<String>,
}

fn fallback_quote() -> Quote {
    Quote {
        content: "The journey of a thousand miles begins with a single step.".into(),
        author: Some("Laozi".into()),
    }
}

#[derive(Serialize)]
struct LandingView {
    quote: Quote,
    messages: Vec<String>,
}

async fn index(
    IndexPath(): IndexPath,
    State(http): State<reqwest::Client>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>)> {
    // The quote is decoration: an unreachable or slow quote service must
    // not take the landing page down with it.
    let quote = match fetch_quote(&http).await {
        Ok(quote) => quote,
        Err(error) => {
            warn!(%error, "Quote service unavailable, using fallback");
            fallback_quote()
        }
    };

    let (jar, messages) = flash::take(jar);
    let page = views::render("index", &LandingView { quote, messages })?;

    Ok((jar, page))
}

async fn fetch_quote(http: &reqwest::Client) -> Result<Quote, reqwest::Error> {
    http.get(QUOTE_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
