//! End-to-end exercises of the authenticated transport against a
//! scripted loopback server: bearer attachment, the single
//! refresh-and-replay, forced logout, and verbatim propagation.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use base64::Engine;
use serde_json::json;

use agentid_client::session::{HandlerError, LogoutHandler, TokenExpiredHandler};
use agentid_client::{ApiClient, AuthPolicy, ClientError, LogoutOptions, RequestSpec, SessionHandlers};
use agentid_core::credentials::{AccessToken, CredentialBundle, IdToken};

use support::StubServer;

fn make_jwt(claims: serde_json::Value) -> String {
    let b64 =
        |v: &serde_json::Value| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(v.to_string());
    format!("{}.{}.sig", b64(&json!({"alg": "RS256"})), b64(&claims))
}

fn bundle(subject: &str) -> CredentialBundle {
    let access = AccessToken::parse(make_jwt(json!({"sub": subject, "tenant": "t-1"}))).unwrap();
    let id = IdToken::parse(make_jwt(json!({"sub": subject}))).unwrap();
    CredentialBundle::from_tokens(Some(access), Some(id), None).unwrap()
}

fn refresh_to(bundle: CredentialBundle, calls: Arc<AtomicUsize>) -> TokenExpiredHandler {
    Arc::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        let bundle = bundle.clone();
        Box::pin(async move { Ok::<_, HandlerError>(Some(bundle)) })
    })
}

fn refresh_to_nothing(calls: Arc<AtomicUsize>) -> TokenExpiredHandler {
    Arc::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok::<_, HandlerError>(None) })
    })
}

fn recording_logout(log: Arc<Mutex<Vec<LogoutOptions>>>) -> LogoutHandler {
    Arc::new(move |options| {
        log.lock().unwrap().push(options);
        Ok(())
    })
}

fn client_for(server: &StubServer) -> ApiClient {
    ApiClient::new(server.base_url.as_str(), AuthPolicy::default())
}

#[tokio::test]
async fn bearer_is_attached_from_the_bundle() {
    let server = StubServer::start(vec![(200, json!({"ok": true}))]).await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let value = client.execute(RequestSpec::get("/session")).await.unwrap();
    assert_eq!(value, json!({"ok": true}));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let expected = format!("Bearer {}", bundle("jdoe").bearer());
    assert_eq!(requests[0].authorization.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn no_bearer_without_a_bundle() {
    let server = StubServer::start(vec![(200, json!({}))]).await;
    let client = client_for(&server);

    client.execute(RequestSpec::get("/health")).await.unwrap();
    assert!(server.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn refresh_success_replays_once_with_new_bearer() {
    let server = StubServer::start(vec![
        (401, json!({"error": "unauthorized", "message": "token expired"})),
        (200, json!({"tenants": [{"id": "t-1"}]})),
    ])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let renewed = bundle("jdoe-renewed");
    let refresh_calls = Arc::new(AtomicUsize::new(0));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(renewed.clone(), refresh_calls.clone())),
        logout: None,
    });

    let value = client.execute(RequestSpec::get("/tenant")).await.unwrap();
    assert_eq!(value["tenants"][0]["id"], "t-1");
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some(format!("Bearer {}", bundle("jdoe").bearer()).as_str())
    );
    assert_eq!(
        requests[1].authorization.as_deref(),
        Some(format!("Bearer {}", renewed.bearer()).as_str())
    );

    // The renewed bundle became the client default.
    assert_eq!(client.auth_info().unwrap().bearer(), renewed.bearer());
}

#[tokio::test]
async fn replay_failure_propagates_without_second_refresh() {
    let server = StubServer::start(vec![
        (401, json!({"message": "token expired"})),
        (401, json!({"message": "token expired"})),
    ])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(Mutex::new(Vec::new()));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), refresh_calls.clone())),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.request_count(), 2);
    assert!(logouts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_later_episode_qualifies_for_refresh_again() {
    let server = StubServer::start(vec![
        (401, json!({"message": "token expired"})),
        (200, json!({"first": true})),
        (401, json!({"message": "token expired"})),
        (200, json!({"second": true})),
    ])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), refresh_calls.clone())),
        logout: None,
    });

    let first = client.execute(RequestSpec::get("/apps")).await.unwrap();
    let second = client.execute(RequestSpec::get("/apps")).await.unwrap();
    assert_eq!(first, json!({"first": true}));
    assert_eq!(second, json!({"second": true}));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 2);
    assert_eq!(server.request_count(), 4);
}

#[tokio::test]
async fn refresh_yielding_nothing_forces_logout_without_replay() {
    let server = StubServer::start(vec![(401, json!({"message": "token expired"}))]).await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(Mutex::new(Vec::new()));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to_nothing(refresh_calls.clone())),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.request_count(), 1);

    let logouts = logouts.lock().unwrap();
    assert_eq!(logouts.len(), 1);
    assert_eq!(logouts[0], LogoutOptions::revoke_all());
}

#[tokio::test]
async fn refresh_handler_error_forces_logout() {
    let server = StubServer::start(vec![(401, json!({"message": "token expired"}))]).await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let logouts = Arc::new(Mutex::new(Vec::new()));
    let failing: TokenExpiredHandler = Arc::new(|| {
        Box::pin(async {
            Err::<Option<CredentialBundle>, HandlerError>("issuer unreachable".into())
        })
    });
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(failing),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(logouts.lock().unwrap().len(), 1);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn no_session_logs_out_without_consulting_refresh() {
    let server = StubServer::start(vec![(500, json!({"error": "internal_error"}))]).await;
    let client = client_for(&server);

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(Mutex::new(Vec::new()));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to_nothing(refresh_calls.clone())),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(logouts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn non_auth_failure_propagates_verbatim() {
    let server = StubServer::start(vec![(
        500,
        json!({"error": "internal_error", "message": "boom", "request_id": "req-9"}),
    )])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(Mutex::new(Vec::new()));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), refresh_calls.clone())),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    let ClientError::Api { status, body } = err else {
        panic!("expected Api error, got {err:?}");
    };
    assert_eq!(status, 500);
    assert_eq!(body.message.as_deref(), Some("boom"));
    assert_eq!(body.request_id.as_deref(), Some("req-9"));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 0);
    assert!(logouts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn not_authorized_marker_short_circuits_to_logout() {
    let server = StubServer::start(vec![(
        401,
        json!({"error": "unauthorized", "message": "user is not authorized for this tenant"}),
    )])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let logouts = Arc::new(Mutex::new(Vec::new()));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), refresh_calls.clone())),
        logout: Some(recording_logout(logouts.clone())),
    });

    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(logouts.lock().unwrap().len(), 1);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn logout_handler_failure_is_swallowed() {
    let server = StubServer::start(vec![(401, json!({"message": "token expired"}))]).await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let failing_logout: LogoutHandler = Arc::new(|_| Err("redirect failed".into()));
    let refresh_calls = Arc::new(AtomicUsize::new(0));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to_nothing(refresh_calls.clone())),
        logout: Some(failing_logout),
    });

    // The handler error is logged, not surfaced: the caller still
    // sees the session as expired.
    let err = client.execute(RequestSpec::get("/apps")).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn reprovisioning_replaces_handlers_instead_of_stacking() {
    let server = StubServer::start(vec![
        (401, json!({"message": "token expired"})),
        (200, json!({})),
    ])
    .await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));

    let stale_calls = Arc::new(AtomicUsize::new(0));
    let live_calls = Arc::new(AtomicUsize::new(0));
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), stale_calls.clone())),
        logout: None,
    });
    client.set_token_expired_handlers(SessionHandlers {
        token_expired: Some(refresh_to(bundle("jdoe"), live_calls.clone())),
        logout: None,
    });

    client.execute(RequestSpec::get("/apps")).await.unwrap();
    assert_eq!(stale_calls.load(Ordering::SeqCst), 0);
    assert_eq!(live_calls.load(Ordering::SeqCst), 1);
}

struct FailingSink;

impl agentid_client::Analytics for FailingSink {
    fn track(
        &self,
        _: &str,
        _: serde_json::Value,
    ) -> Result<(), agentid_client::analytics::AnalyticsError> {
        Err(agentid_client::analytics::AnalyticsError {
            reason: "sink offline".to_string(),
        })
    }
}

#[tokio::test]
async fn telemetry_failure_does_not_affect_the_request() {
    let server = StubServer::start(vec![(200, json!({"ok": true}))]).await;
    let client = client_for(&server);
    client.set_auth_info(Some(bundle("jdoe")));
    client.set_analytics(Some(Arc::new(FailingSink)));

    let value = client.execute(RequestSpec::get("/session")).await.unwrap();
    assert_eq!(value, json!({"ok": true}));
    assert!(server.requests()[0].authorization.is_some());
}

struct RecordingSink(Mutex<Vec<(String, serde_json::Value)>>);

impl agentid_client::Analytics for RecordingSink {
    fn track(
        &self,
        event: &str,
        properties: serde_json::Value,
    ) -> Result<(), agentid_client::analytics::AnalyticsError> {
        self.0.lock().unwrap().push((event.to_string(), properties));
        Ok(())
    }
}

#[tokio::test]
async fn every_request_emits_a_telemetry_event() {
    let server = StubServer::start(vec![(200, json!({}))]).await;
    let client = client_for(&server);
    let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
    client.set_analytics(Some(sink.clone()));

    client
        .execute(RequestSpec::post("/apps").with_body(json!({"name": "a"})))
        .await
        .unwrap();

    let events = sink.0.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "API_REQUEST");
    assert_eq!(events[0].1["method"], "POST");
    assert!(events[0].1["url"].as_str().unwrap().ends_with("/apps"));
}
