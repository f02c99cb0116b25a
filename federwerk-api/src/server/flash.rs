//! One-shot user-visible messages, carried between a redirect and the
//! next rendered page in a signed cookie.

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::Cookie;

pub const FLASH_COOKIE: &str = "flash";

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .build()
}

fn stored(jar: &SignedCookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

#[must_use]
pub fn push(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    push_all(jar, [message.into()])
}

#[must_use]
pub fn push_all(
    jar: SignedCookieJar,
    messages: impl IntoIterator<Item = String>,
) -> SignedCookieJar {
    let mut all = stored(&jar);
    all.extend(messages);

    // Serializing a Vec<String> cannot fail.
    let value = serde_json::to_string(&all).unwrap_or_default();
    jar.add(flash_cookie(value))
}

/// Consumes the pending messages: the cookie is cleared on the response
/// that renders them.
#[must_use]
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<String>) {
    let messages = stored(&jar);
    let jar = jar.remove(flash_cookie(String::new()));

    (jar, messages)
}
