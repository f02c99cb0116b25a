//! End-to-end request flows over an in-memory database.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response as HttpResponse, StatusCode, header};
use federwerk_api::server::{self, Key, ServerState};
use federwerk_common::model::auth::derive_signing_material;
use federwerk_common::model::post::PostDate;
use federwerk_db::client::DbClient;
use federwerk_db::schema::Dialect;
use sqlx::any::AnyPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::UtcDateTime;
use tower::ServiceExt;

type Response = HttpResponse<Body>;

/// Drives the full router, replaying cookies like a browser would.
struct TestApp {
    router: Router,
    cookies: HashMap<String, String>,
}

impl TestApp {
    async fn new() -> Self {
        federwerk_db::client::install_drivers();

        // A single connection keeps the in-memory database alive and shared.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db_client = DbClient::new(pool, Dialect::Sqlite);
        db_client.init_schema().await.unwrap();

        let state = ServerState {
            db_client: Arc::new(db_client),
            cookie_key: Key::from(&derive_signing_material("test-secret").unwrap()),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_millis(250))
                .build()
                .unwrap(),
        };

        Self {
            router: server::routes().with_state(state),
            cookies: HashMap::new(),
        }
    }

    async fn get(&mut self, path: &str) -> Response {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post_form(&mut self, path: &str, form: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie_header.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap().split(';').next().unwrap();
            let (name, value) = raw.split_once('=').unwrap();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        response
    }

    async fn register(&mut self, email_encoded: &str) {
        let response = self
            .post_form(
                "/register",
                &format!(
                    "email={email_encoded}&age=30&password=secret1&password_confirm=secret1"
                ),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/feed-page");
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn landing_page_renders_even_without_the_quote_service() {
    let mut app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("data-view=\"index\""));
    assert!(body.contains("\"quote\""));
}

#[tokio::test]
async fn feed_requires_login() {
    let mut app = TestApp::new().await;

    let response = app.get("/feed-page").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn registration_logs_in_and_lands_on_the_feed() {
    let mut app = TestApp::new().await;

    app.register("a%40b.com").await;
    assert!(app.cookies.contains_key("session"));

    let response = app.get("/feed-page").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("data-view=\"feed\""));
}

#[tokio::test]
async fn duplicate_registration_is_sent_to_login_instead() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;

    let response = app
        .post_form(
            "/register",
            "email=a%40b.com&age=25&password=other66&password_confirm=other66",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let login_page = app.get("/login").await;
    let body = body_text(login_page).await;
    assert!(body.contains("already signed up with that e-mail"));
}

#[tokio::test]
async fn register_validation_rerenders_with_field_messages() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form(
            "/register",
            "email=nonsense&age=30&password=secret1&password_confirm=secret1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Error in the E-mail* field"));
    // Prior input is preserved in the data bag.
    assert!(body.contains("nonsense"));
}

#[tokio::test]
async fn mismatched_confirmation_is_reported() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form(
            "/register",
            "email=a%40b.com&age=30&password=secret1&password_confirm=secret2",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Passwords do not match!"));
}

#[tokio::test]
async fn non_numeric_age_is_reported() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form(
            "/register",
            "email=a%40b.com&age=old&password=secret1&password_confirm=secret1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Age must be a number!"));
}

#[tokio::test]
async fn wrong_password_gets_a_generic_message_and_no_session() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    app.get("/logout").await;
    assert!(!app.cookies.contains_key("session"));

    let response = app
        .post_form("/login", "email=a%40b.com&password=wrong66")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(!app.cookies.contains_key("session"));

    let login_page = app.get("/login").await;
    let body = body_text(login_page).await;
    assert!(body.contains("Please check your login details and try again."));
}

#[tokio::test]
async fn login_with_correct_credentials_establishes_a_session() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    app.get("/logout").await;

    let response = app
        .post_form("/login", "email=a%40b.com&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/feed-page");
    assert!(app.cookies.contains_key("session"));
}

#[tokio::test]
async fn new_post_shows_up_in_the_feed_with_todays_date() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;

    let response = app.post_form("/new-post", "title=Hello&body=World").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/feed-page");

    let today = PostDate::stamp(UtcDateTime::now()).unwrap();
    let feed = body_text(app.get("/feed-page").await).await;
    assert!(feed.contains("Hello"));
    assert!(feed.contains("World"));
    assert!(feed.contains(today.get()));
}

#[tokio::test]
async fn post_validation_rerenders_the_form() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;

    let response = app.post_form("/new-post", "title=&body=World").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Error in the Title field"));
}

#[tokio::test]
async fn deleting_a_missing_post_is_a_clean_not_found() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;

    let response = app.get("/delete-post/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_delete_of_the_same_post_is_not_found() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    app.post_form("/new-post", "title=Hello&body=World").await;

    let first = app.get("/delete-post/1").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/feed-page");

    let second = app.get("/delete-post/1").await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_may_delete_a_post() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    app.post_form("/new-post", "title=Mine&body=Hands+off").await;
    app.get("/logout").await;

    app.register("c%40d.com").await;
    let response = app.get("/delete-post/1").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_lists_only_the_current_users_posts() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    app.post_form("/new-post", "title=First&body=by+a").await;
    app.get("/logout").await;

    app.register("c%40d.com").await;
    app.post_form("/new-post", "title=Second&body=by+c").await;

    let profile = body_text(app.get("/profile").await).await;
    assert!(profile.contains("Second"));
    assert!(!profile.contains("First"));
}

#[tokio::test]
async fn change_name_redirects_to_profile() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;

    let response = app.get("/change-name").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
}

#[tokio::test]
async fn logout_invalidates_a_replayed_cookie() {
    let mut app = TestApp::new().await;
    app.register("a%40b.com").await;
    let session = app.cookies.get("session").unwrap().clone();

    let response = app.get("/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The session row is gone, so replaying the old cookie must not work.
    app.cookies.insert("session".into(), session);
    let response = app.get("/feed-page").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn unknown_routes_fall_back_to_not_found() {
    let mut app = TestApp::new().await;

    let response = app.get("/no-such-page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
