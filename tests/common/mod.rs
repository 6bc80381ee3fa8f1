#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use chronicle::{
    ServerConfig, create_app,
    db::Database,
    jwt::JwtConfig,
    password::{CredentialHasher, PasswordConfig},
};
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-for-testing-only-0123456789";

/// Hasher with cheap Argon2 parameters so tests do not spend time hashing.
pub fn test_hasher() -> CredentialHasher {
    let config = PasswordConfig::new(64, 1, 1).expect("valid test hash parameters");
    CredentialHasher::new(&config).expect("Failed to build test hasher")
}

pub fn test_config(db: Database, base: Option<&str>) -> ServerConfig {
    test_config_with_hasher(db, base, test_hasher())
}

pub fn test_config_with_hasher(
    db: Database,
    base: Option<&str>,
    hasher: CredentialHasher,
) -> ServerConfig {
    ServerConfig {
        base: base.map(|s| s.to_string()),
        db,
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        token_ttl: Duration::from_secs(60 * 60),
        hasher,
    }
}

/// Create a test app and return (app, db, jwt_config).
pub async fn create_test_app() -> (Router, Database, JwtConfig) {
    create_test_app_with_base(None).await
}

pub async fn create_test_app_with_base(base: Option<&str>) -> (Router, Database, JwtConfig) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = test_config(db.clone(), base);
    (create_app(&config), db, JwtConfig::new(TEST_JWT_SECRET))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Sign up through the API and return the new user's id.
pub async fn signup(app: &Router, username: &str, email: &str, password: &str) -> String {
    let body = serde_json::json!({
        "username": username,
        "email": email,
        "password": password,
    })
    .to_string();
    let response = send(app, "POST", "/auth/signup", None, Some(&body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Log in through the API and return the token.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password }).to_string();
    let response = send(app, "POST", "/auth/login", None, Some(&body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

/// Sign up and log in. Returns (user_id, token).
pub async fn register(app: &Router, username: &str) -> (String, String) {
    let email = format!("{}@example.com", username);
    let id = signup(app, username, &email, "correct horse").await;
    let token = login(app, &email, "correct horse").await;
    (id, token)
}

/// Create a blog post and return its id.
pub async fn create_blog(app: &Router, token: &str, title: &str, content: &str) -> String {
    let body = serde_json::json!({ "title": title, "content": content }).to_string();
    let response = send(app, "POST", "/blogs", Some(token), Some(&body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
