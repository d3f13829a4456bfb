use std::sync::{Arc, Mutex};

use serde_json::json;

use super::*;
use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::client::navigation::{AuthEvents, spawn_navigation_controller};
use crate::client::api::GatewayConfig;
use crate::routes::app;
use crate::services::identity::BackendReply;
use crate::state::test_helpers::{MockIdentity, spawn_server, test_app_state, test_pages};

#[derive(Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.lock().unwrap().push(path.to_owned());
    }
}

async fn gateway_for(mock: Arc<MockIdentity>) -> ApiGateway {
    gateway_with_events(mock, &AuthEvents::new()).await
}

async fn gateway_with_events(mock: Arc<MockIdentity>, events: &AuthEvents) -> ApiGateway {
    let origin = spawn_server(app(test_app_state(mock), test_pages())).await;
    ApiGateway::new(GatewayConfig::new(origin), events.clone()).unwrap()
}

#[tokio::test]
async fn sign_in_success_marks_store_and_goes_to_dashboard() {
    let gateway = gateway_for(Arc::new(MockIdentity::accepting("t-1"))).await;
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    let outcome = sign_in(&store, &gateway, &navigator, "ada", "pw").await.unwrap();

    assert_eq!(outcome, FlowOutcome::Done { message: Some("Login successful".into()) });
    let record = store.snapshot();
    assert!(record.is_authenticated);
    assert!(!record.is_loading);
    assert!(record.error.is_none());
    assert_eq!(navigator.visited(), vec![DASHBOARD_PATH.to_owned()]);
}

#[tokio::test]
async fn sign_in_rejection_records_backend_message() {
    let mock = MockIdentity::with_login(BackendReply {
        status: 401,
        body: json!({ "success": false, "message": "Invalid credentials" }),
    });
    let gateway = gateway_for(Arc::new(mock)).await;
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    let outcome = sign_in(&store, &gateway, &navigator, "ada", "nope").await.unwrap();

    assert_eq!(outcome, FlowOutcome::Rejected { message: "Invalid credentials".into() });
    let record = store.snapshot();
    assert!(!record.is_authenticated);
    assert!(!record.is_loading);
    assert_eq!(record.error.as_deref(), Some("Invalid credentials"));
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn sign_in_rejection_message_survives_navigation_controller() {
    let mock = MockIdentity::with_login(BackendReply {
        status: 401,
        body: json!({ "success": false, "message": "Invalid credentials" }),
    });
    let events = AuthEvents::new();
    let gateway = gateway_with_events(Arc::new(mock), &events).await;
    let store = SessionStore::new();
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = spawn_navigation_controller(&events, store.clone(), navigator.clone());

    let outcome = sign_in(&store, &gateway, navigator.as_ref(), "ada", "wrong").await.unwrap();

    drop(gateway);
    drop(events);
    controller.await.unwrap();

    assert_eq!(outcome, FlowOutcome::Rejected { message: "Invalid credentials".into() });
    assert_eq!(store.snapshot().error.as_deref(), Some("Invalid credentials"));
    assert!(!store.snapshot().is_authenticated);
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn sign_in_validation_failure_is_inline() {
    let gateway = gateway_for(Arc::new(MockIdentity::accepting("unused"))).await;
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    let outcome = sign_in(&store, &gateway, &navigator, "   ", "pw").await.unwrap();

    assert_eq!(outcome, FlowOutcome::Rejected { message: "Username and password are required".into() });
    assert!(!store.snapshot().is_authenticated);
}

#[tokio::test]
async fn sign_in_network_failure_is_returned() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let gateway = ApiGateway::new(GatewayConfig::new(origin), AuthEvents::new()).unwrap();
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    let err = sign_in(&store, &gateway, &navigator, "ada", "pw").await.unwrap_err();

    assert!(matches!(err, GatewayError::Network(_)));
    assert!(store.snapshot().error.is_some());
    assert!(!store.snapshot().is_loading);
}

#[tokio::test]
async fn rehydrate_follows_cookie_presence() {
    let gateway = gateway_for(Arc::new(MockIdentity::accepting("t-2"))).await;
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    assert!(!rehydrate(&store, &gateway).await.unwrap());
    assert!(!store.snapshot().is_authenticated);

    sign_in(&store, &gateway, &navigator, "ada", "pw").await.unwrap();
    store.reset();

    assert!(rehydrate(&store, &gateway).await.unwrap());
    let record = store.snapshot();
    assert!(record.is_authenticated);
    assert!(!record.is_loading);
}

#[tokio::test]
async fn rehydrate_corrects_stale_store_without_cookie() {
    let mock = Arc::new(MockIdentity::accepting("unused"));
    let gateway = gateway_for(mock.clone()).await;
    let store = SessionStore::new();
    store.set_is_authenticated(true);
    store.set_user(Some(crate::client::SessionUser {
        id: "u-1".into(),
        username: "ada".into(),
        email: None,
    }));

    // The guard answers from the cookie alone, whatever the store claims.
    let page = app(test_app_state(mock), test_pages())
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(page.headers()[LOCATION], LOGIN_PATH);

    assert!(!rehydrate(&store, &gateway).await.unwrap());
    let record = store.snapshot();
    assert!(!record.is_authenticated);
    assert!(record.user.is_none());
    assert!(!record.is_loading);
}

#[tokio::test]
async fn sign_out_clears_store_and_goes_to_login() {
    let mock = Arc::new(MockIdentity::accepting("t-3"));
    let gateway = gateway_for(mock.clone()).await;
    let store = SessionStore::new();
    let navigator = RecordingNavigator::default();

    sign_in(&store, &gateway, &navigator, "ada", "pw").await.unwrap();
    sign_out(&store, &gateway, &navigator).await.unwrap();

    assert!(!store.snapshot().is_authenticated);
    assert_eq!(navigator.visited(), vec![DASHBOARD_PATH.to_owned(), LOGIN_PATH.to_owned()]);
    assert!(mock.wait_for_calls(2).await.contains(&"logout:t-3".to_owned()));
    assert!(!rehydrate(&store, &gateway).await.unwrap());
}

#[tokio::test]
async fn password_reset_reports_backend_outcome() {
    let gateway = gateway_for(Arc::new(MockIdentity::accepting("unused"))).await;

    let outcome = request_password_reset(&gateway, "ada@example.com").await.unwrap();
    assert_eq!(outcome, FlowOutcome::Done { message: Some("sent".into()) });

    let outcome = request_password_reset(&gateway, "").await.unwrap();
    assert_eq!(outcome, FlowOutcome::Rejected { message: "Email is required".into() });
}
