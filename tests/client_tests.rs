//! Tests for the client against a live server.

mod common;

use chronicle::client::{
    ApiClient, AuthOutcome, AuthService, ClientError, FailureKind, FileStorage, MemoryStorage,
    SessionStorage,
};
use chronicle::db::Database;
use chronicle::start_server;
use reqwest::StatusCode;
use std::time::Duration;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn spawn_server(base: Option<&str>) -> TestServer {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = common::test_config(db, base);
    let (handle, addr) = start_server(config, 0).await.expect("Failed to start server");
    TestServer {
        base_url: format!("http://{}{}", addr, base.unwrap_or("")),
        handle,
    }
}

fn memory_service(server: &TestServer) -> AuthService<MemoryStorage> {
    let api = ApiClient::new(&server.base_url).unwrap();
    AuthService::new(api, MemoryStorage::default())
}

#[tokio::test]
async fn test_signup_does_not_create_session() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);

    let outcome = service.signup("alice", "a@x.com", "pw1").await;

    assert_eq!(outcome, AuthOutcome::Success(()));
    assert!(service.current_user().is_none());
    assert!(service.token().is_none());
}

#[tokio::test]
async fn test_login_persists_session() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);
    assert!(service.signup("alice", "a@x.com", "pw1").await.is_success());

    let outcome = service.login("a@x.com", "pw1").await;

    let AuthOutcome::Success(user) = outcome else {
        panic!("login failed: {:?}", outcome);
    };
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "a@x.com");
    assert_eq!(service.current_user(), Some(user.clone()));

    let me = service.me().await.unwrap();
    assert_eq!(me, user);
}

#[tokio::test]
async fn test_logout_is_local_only() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);
    service.signup("alice", "a@x.com", "pw1").await;
    service.login("a@x.com", "pw1").await;
    let token = service.token().unwrap();

    assert!(service.logout().is_success());

    assert!(service.current_user().is_none());
    assert!(matches!(service.me().await, Err(ClientError::NotLoggedIn)));

    // The server never learned about the logout
    let me = service.api().me(&token).await.unwrap();
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn test_wrong_password() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);
    service.signup("alice", "a@x.com", "pw1").await;

    let outcome = service.login("a@x.com", "wrong").await;

    assert_eq!(
        outcome,
        AuthOutcome::Failure {
            kind: FailureKind::InvalidCredentials,
            message: "Invalid credentials".to_string(),
        }
    );
    assert!(service.current_user().is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);
    service.signup("alice", "a@x.com", "pw1").await;
    service.login("a@x.com", "pw1").await;

    let outcome = service.login("a@x.com", "wrong").await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidCredentials));
    assert_eq!(service.current_user().unwrap().username, "alice");
}

#[tokio::test]
async fn test_duplicate_signup() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);
    service.signup("alice", "a@x.com", "pw1").await;

    let outcome = service.signup("alice2", "a@x.com", "pw2").await;

    assert_eq!(
        outcome,
        AuthOutcome::Failure {
            kind: FailureKind::Conflict,
            message: "Email already registered".to_string(),
        }
    );
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let server = spawn_server(None).await;
    let service = memory_service(&server);

    let outcome = service.signup("", "a@x.com", "pw1").await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));
}

#[tokio::test]
async fn test_unreachable_server() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::with_timeout(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let service = AuthService::new(api, MemoryStorage::default());

    let outcome = service.login("a@x.com", "pw1").await;

    let AuthOutcome::Failure { kind, message } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(kind, FailureKind::Unavailable);
    assert!(!message.is_empty());
    assert!(service.current_user().is_none());
}

#[tokio::test]
async fn test_blog_crud_through_service() {
    let server = spawn_server(None).await;
    let alice = memory_service(&server);
    let bob = memory_service(&server);
    alice.signup("alice", "a@x.com", "pw1").await;
    bob.signup("bob", "b@x.com", "pw2").await;
    alice.login("a@x.com", "pw1").await;
    bob.login("b@x.com", "pw2").await;

    let blog = alice.create_blog("Hello", "World").await.unwrap();
    assert_eq!(blog.author.username, "alice");

    let listed = bob.list_blogs().await.unwrap();
    assert_eq!(listed, vec![blog.clone()]);

    let err = bob
        .update_blog(&blog.id, Some("Hijacked"), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

    let err = bob.delete_blog(&blog.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

    let updated = alice
        .update_blog(&blog.id, None, Some("Everyone"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Hello");
    assert_eq!(updated.content, "Everyone");

    alice.delete_blog(&blog.id).await.unwrap();

    let err = bob.get_blog(&blog.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let server = spawn_server(None).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let service = AuthService::new(
        ApiClient::new(&server.base_url).unwrap(),
        FileStorage::new(&path),
    );
    service.signup("alice", "a@x.com", "pw1").await;
    service.login("a@x.com", "pw1").await;

    // A new client over the same file picks up the session
    let reopened = AuthService::new(
        ApiClient::new(&server.base_url).unwrap(),
        FileStorage::new(&path),
    );
    assert_eq!(reopened.current_user().unwrap().username, "alice");
    assert_eq!(reopened.me().await.unwrap().email, "a@x.com");

    assert!(reopened.logout().is_success());
    assert!(service.current_user().is_none());
    assert!(service.session().storage().load().unwrap().is_none());
}

#[tokio::test]
async fn test_client_with_base_path() {
    let server = spawn_server(Some("/api")).await;
    let service = memory_service(&server);

    assert!(service.signup("alice", "a@x.com", "pw1").await.is_success());
    assert!(service.login("a@x.com", "pw1").await.is_success());
    assert!(service.list_blogs().await.unwrap().is_empty());
}
