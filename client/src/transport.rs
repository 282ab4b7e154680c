use std::sync::Arc;
use std::sync::Mutex;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use agentid_core::credentials::CredentialBundle;
use agentid_core::error::ApiErrorBody;

use crate::analytics::{API_REQUEST_EVENT, Analytics, track_event};
use crate::session::{
    DEFAULT_REQUEST_TIMEOUT, Session, SessionHandlers, TokenExpiredHandler, safe_logout,
};

/// Message marker distinguishing "this user is not authorized at all"
/// from an expired token. A failure carrying it must not trigger a
/// renewal attempt.
pub const USER_NOT_AUTHORIZED_MARKER: &str = "user is not authorized";

/// Which failures count as potentially recoverable auth failures, and
/// which message marker short-circuits recovery. One policy per
/// client, applied uniformly by the shared transport.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub auth_statuses: Vec<u16>,
    pub not_authorized_marker: Option<String>,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            auth_statuses: vec![401, 403],
            not_authorized_marker: Some(USER_NOT_AUTHORIZED_MARKER.to_string()),
        }
    }
}

impl AuthPolicy {
    fn is_auth_status(&self, status: u16) -> bool {
        self.auth_statuses.contains(&status)
    }
}

/// An outgoing request, described independently of the transport so a
/// failed request can be replayed verbatim after a token refresh.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend rejected the request; the payload is passed through
    /// untouched.
    #[error("request failed with status {status}")]
    Api { status: u16, body: ApiErrorBody },
    /// Connection-level failure from the underlying HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response body did not decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// The session could not be recovered; the logout hook has already
    /// been invoked.
    #[error("session expired, logout initiated")]
    SessionExpired,
}

enum Outcome {
    Success(Value),
    Failure { status: u16, body: Value },
}

/// Authenticated HTTP client for one backend domain.
///
/// Wiring is static: decoration and recovery are part of the request
/// path from construction, so repeated provisioning replaces session
/// data instead of stacking interceptors. Every request:
///
/// 1. attaches `Authorization: Bearer <token>` when credentials are
///    present, and emits a best-effort analytics event;
/// 2. on an auth-relevant failure, attempts one silent renewal through
///    the registered handler and replays the original request once;
/// 3. forces logout when recovery is impossible, and otherwise
///    propagates the failure unchanged.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    policy: AuthPolicy,
    session: Mutex<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, policy: AuthPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the session's credential bundle. Also (re)applies the
    /// default request timeout, matching provisioning behavior on
    /// every credential change (login, refresh, tenant switch).
    pub fn set_auth_info(&self, bundle: Option<CredentialBundle>) {
        let mut session = self.lock_session();
        session.auth_info = bundle;
        session.timeout = DEFAULT_REQUEST_TIMEOUT;
    }

    /// Replace the externally supplied renewal/logout hooks.
    pub fn set_token_expired_handlers(&self, handlers: SessionHandlers) {
        self.lock_session().handlers = handlers;
    }

    /// Replace the optional telemetry sink.
    pub fn set_analytics(&self, analytics: Option<Arc<dyn Analytics>>) {
        self.lock_session().analytics = analytics;
    }

    /// Last-known credential bundle, if any.
    pub fn auth_info(&self) -> Option<CredentialBundle> {
        self.lock_session().auth_info.clone()
    }

    /// Issue a request and run the full recovery state machine on
    /// failure. Returns the response body as raw JSON.
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value, ClientError> {
        match self.dispatch(&spec).await? {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure { status, body } => self.recover(spec, status, body).await,
        }
    }

    /// [`execute`](Self::execute), decoded into a typed response.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<T, ClientError> {
        let value = self.execute(spec).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// One failure episode (spec order matters):
    ///
    /// 1. credentials present and the status is auth-relevant: the
    ///    non-recoverable marker or a missing renewal handler forces
    ///    logout; otherwise renew once — a fresh bundle is installed
    ///    as the client's default credentials and the original request
    ///    is replayed exactly once, its outcome returned verbatim (a
    ///    second auth failure on the replay propagates, it never
    ///    re-renews); renewal yielding nothing, or failing, forces
    ///    logout;
    /// 2. no credentials at all: any failure forces logout and the
    ///    renewal handler is never consulted (a bundle is
    ///    all-or-nothing, so "no bundle" and "no usable access token"
    ///    coincide here);
    /// 3. anything else propagates unchanged.
    async fn recover(
        &self,
        spec: RequestSpec,
        status: u16,
        body: Value,
    ) -> Result<Value, ClientError> {
        let (has_bundle, handlers) = {
            let session = self.lock_session();
            (session.auth_info.is_some(), session.handlers.clone())
        };

        if has_bundle && self.policy.is_auth_status(status) {
            let err_body = ApiErrorBody::from_value(&body);
            let marker_hit = self
                .policy
                .not_authorized_marker
                .as_deref()
                .is_some_and(|marker| err_body.message_contains(marker));
            if marker_hit {
                tracing::info!(status, "auth failure is not recoverable, logging out");
                safe_logout(handlers.logout.as_ref());
                return Err(ClientError::SessionExpired);
            }

            let Some(token_expired) = handlers.token_expired.clone() else {
                safe_logout(handlers.logout.as_ref());
                return Err(ClientError::SessionExpired);
            };

            match self.renew(&token_expired).await {
                Some(bundle) => {
                    // The refreshed bundle becomes the client default:
                    // the replay and every later request read the new
                    // bearer from the session.
                    self.set_auth_info(Some(bundle));
                    match self.dispatch(&spec).await? {
                        Outcome::Success(value) => Ok(value),
                        Outcome::Failure { status, body } => Err(ClientError::Api {
                            status,
                            body: ApiErrorBody::from_value(&body),
                        }),
                    }
                }
                None => {
                    safe_logout(handlers.logout.as_ref());
                    Err(ClientError::SessionExpired)
                }
            }
        } else if !has_bundle {
            safe_logout(handlers.logout.as_ref());
            Err(ClientError::SessionExpired)
        } else {
            Err(ClientError::Api {
                status,
                body: ApiErrorBody::from_value(&body),
            })
        }
    }

    async fn renew(&self, token_expired: &TokenExpiredHandler) -> Option<CredentialBundle> {
        match token_expired().await {
            Ok(bundle) => bundle,
            Err(err) => {
                tracing::warn!(error = %err, "token renewal failed");
                None
            }
        }
    }

    /// Build, decorate and send one request. No recovery here; the
    /// caller decides what a failure outcome means.
    async fn dispatch(&self, spec: &RequestSpec) -> Result<Outcome, ClientError> {
        let (bearer, timeout, analytics) = {
            let session = self.lock_session();
            (
                session
                    .auth_info
                    .as_ref()
                    .map(|bundle| bundle.bearer().to_string()),
                session.timeout,
                session.analytics.clone(),
            )
        };

        let url = format!("{}{}", self.base_url, spec.path);
        let request_id = Uuid::now_v7();

        let mut request = self
            .http
            .request(spec.method.clone(), &url)
            .timeout(timeout);
        if let Some(bearer) = &bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        track_event(
            analytics.as_ref(),
            API_REQUEST_EVENT,
            json!({
                "method": spec.method.as_str(),
                "url": url.as_str(),
            }),
        );

        tracing::debug!(request_id = %request_id, method = %spec.method, url, "api request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(Outcome::Success(value))
        } else {
            tracing::debug!(request_id = %request_id, status = status.as_u16(), "api request failed");
            Ok(Outcome::Failure {
                status: status.as_u16(),
                body: value,
            })
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_covers_auth_statuses() {
        let policy = AuthPolicy::default();
        assert!(policy.is_auth_status(401));
        assert!(policy.is_auth_status(403));
        assert!(!policy.is_auth_status(500));
    }

    #[test]
    fn request_spec_builder_accumulates() {
        let spec = RequestSpec::get("/apps")
            .with_param("page", "1")
            .with_param("size", "20");
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.query.len(), 2);
        assert!(spec.body.is_none());
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://localhost:4000/", AuthPolicy::default());
        assert_eq!(client.base_url(), "http://localhost:4000");
    }
}
