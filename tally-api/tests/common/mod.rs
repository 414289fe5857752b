/// Common test utilities for API integration tests
///
/// Tests run against the database named by `DATABASE_URL`; when it is not
/// set, [`TestContext::new`] returns `None` and the test passes without
/// doing anything.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use sqlx::PgPool;
use tally_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DbConfig, LogFormat, SessionConfig},
};
use tally_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::user::User,
};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing the router and its database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    usernames: Vec<String>,
}

impl TestContext {
    /// Connects, migrates and builds the router
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping API test");
            return None;
        };

        let db = create_pool(DatabaseConfig {
            url: url.clone(),
            max_connections: 5,
            ..Default::default()
        })
        .await
        .expect("Failed to connect to test database");

        run_migrations(&db).await.expect("Failed to run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                request_timeout_secs: 30,
                production: false,
            },
            database: DbConfig {
                url,
                max_connections: 5,
                acquire_timeout_secs: 30,
                run_migrations: false,
            },
            session: SessionConfig {
                max_age_secs: 3600,
                secure_cookies: false,
            },
            log_format: LogFormat::Pretty,
        };

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self {
            db,
            app,
            usernames: Vec::new(),
        })
    }

    /// A fresh username, removed again by [`TestContext::cleanup`]
    pub fn username(&mut self, prefix: &str) -> String {
        let username = format!("{}-{}", prefix, Uuid::new_v4());
        self.usernames.push(username.clone());
        username
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Logs in with a form body and returns the `Cookie` header value
    pub async fn login(&self, username: &str, password: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap();

        let response = self.send(request).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_cookie(&response)
    }

    /// Deletes every user created through [`TestContext::username`]
    pub async fn cleanup(&self) {
        for username in &self.usernames {
            if let Some(user) = User::find_by_username(&self.db, username).await.unwrap() {
                User::delete(&self.db, user.id).await.unwrap();
            }
        }
    }
}

/// Turns a response's `Set-Cookie` into a request `Cookie` value
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets no cookie")
        .to_str()
        .unwrap();

    set_cookie.split(';').next().unwrap().to_string()
}

/// Builds a request carrying the session cookie
pub fn authed(method: &str, uri: &str, cookie: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Reads a response body as text
pub async fn text_body(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
