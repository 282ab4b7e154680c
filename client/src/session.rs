use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use agentid_core::credentials::CredentialBundle;

use crate::analytics::Analytics;

/// Default per-request deadline, applied whenever credentials are
/// (re)provisioned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Externally supplied silent-renewal hook. Resolving to `Ok(None)`
/// means renewal is not possible (no refresh token, renewal rejected)
/// and the session is over.
pub type TokenExpiredHandler =
    Arc<dyn Fn() -> BoxFuture<Result<Option<CredentialBundle>, HandlerError>> + Send + Sync>;

/// Externally supplied logout hook. Performs revocation/redirect on
/// its own schedule; the transport does not await anything beyond this
/// call returning.
pub type LogoutHandler = Arc<dyn Fn(LogoutOptions) -> Result<(), HandlerError> + Send + Sync>;

/// What the logout hook is asked to tear down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOptions {
    pub revoke_access_token: bool,
    pub revoke_refresh_token: bool,
    pub clear_tokens_before_redirect: bool,
}

impl LogoutOptions {
    /// The options a forced logout always uses: revoke everything and
    /// clear local tokens before redirecting.
    pub fn revoke_all() -> Self {
        Self {
            revoke_access_token: true,
            revoke_refresh_token: true,
            clear_tokens_before_redirect: true,
        }
    }
}

/// The handler pair installed by the provisioning layer whenever the
/// active auth flow changes.
#[derive(Clone, Default)]
pub struct SessionHandlers {
    pub token_expired: Option<TokenExpiredHandler>,
    pub logout: Option<LogoutHandler>,
}

/// Per-client mutable session record. One per [`crate::ApiClient`];
/// mutated only through the provisioning calls, read by the transport
/// on every request.
pub(crate) struct Session {
    pub auth_info: Option<CredentialBundle>,
    pub timeout: Duration,
    pub handlers: SessionHandlers,
    pub analytics: Option<Arc<dyn Analytics>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            auth_info: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            handlers: SessionHandlers::default(),
            analytics: None,
        }
    }
}

/// Invoke the logout hook without letting its failure reach the
/// request path: an error here is logged and dropped, and the caller
/// still observes the session as expired.
pub(crate) fn safe_logout(handler: Option<&LogoutHandler>) {
    let Some(handler) = handler else {
        tracing::debug!("logout requested but no logout handler registered");
        return;
    };
    if let Err(err) = handler(LogoutOptions::revoke_all()) {
        tracing::error!(error = %err, "logout handler failed");
    }
}
