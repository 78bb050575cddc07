//! Forced Logout Tests
//!
//! A server-asserted 401 must clear the stored session and navigate to
//! login exactly once, no matter how many in-flight requests observe it.
//! A fresh login re-arms the redirect for the next session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tasklight::api::TasksApi;
use tasklight::{ClientConfig, ClientContext, Navigator, RequestGateway};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct CountingNavigator {
    redirects: AtomicUsize,
}

impl CountingNavigator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            redirects: AtomicUsize::new(0),
        })
    }

    fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

async fn rejecting_server() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Could not validate credentials"
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

fn gateway_with_navigator(
    server: &MockServer,
    navigator: Arc<CountingNavigator>,
) -> RequestGateway {
    let context = ClientContext::in_memory();
    context.set_navigator(navigator);
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_discovery(false);
    RequestGateway::new(config, context)
}

#[tokio::test]
async fn test_concurrent_401s_redirect_exactly_once() {
    let mock_server = rejecting_server().await;
    let navigator = CountingNavigator::new();
    let gateway = Arc::new(gateway_with_navigator(&mock_server, navigator.clone()));
    gateway.session().set_token("stale-token").await.unwrap();
    gateway.session().set_user_id("user-1").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let gw = gateway.clone();
        handles.push(tokio::spawn(
            async move { TasksApi::new(&gw).list("user-1").await },
        ));
    }

    for handle in handles {
        let err = handle.await.unwrap().expect_err("401 must fail the request");
        assert!(err.is_auth());
        assert_eq!(err.message(), "Could not validate credentials");
    }

    assert_eq!(navigator.count(), 1, "redirect must fire exactly once");
    assert!(gateway.session().token().await.is_none());
    assert!(gateway.session().user_id().await.is_none());
}

#[tokio::test]
async fn test_fresh_login_rearms_the_redirect() {
    let mock_server = rejecting_server().await;
    let navigator = CountingNavigator::new();
    let gateway = gateway_with_navigator(&mock_server, navigator.clone());

    gateway.session().set_token("first-session").await.unwrap();
    TasksApi::new(&gateway)
        .list("user-1")
        .await
        .expect_err("first 401");
    assert_eq!(navigator.count(), 1);

    // Second session: storing a new token re-arms the one-shot redirect.
    gateway.session().set_token("second-session").await.unwrap();
    TasksApi::new(&gateway)
        .list("user-1")
        .await
        .expect_err("second 401");
    assert_eq!(navigator.count(), 2);
}

#[tokio::test]
async fn test_forced_logout_does_not_fire_logout_hooks() {
    let mock_server = rejecting_server().await;
    let navigator = CountingNavigator::new();
    let gateway = gateway_with_navigator(&mock_server, navigator.clone());

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let hook_calls_clone = hook_calls.clone();
    gateway.context().on_logout(move || {
        hook_calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    gateway.session().set_token("stale-token").await.unwrap();
    TasksApi::new(&gateway)
        .list("user-1")
        .await
        .expect_err("401 must fail");

    // The 401 path clears storage and redirects; only an explicit logout
    // notifies subscribers.
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
    assert_eq!(navigator.count(), 1);

    gateway.session().logout().await;
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}
