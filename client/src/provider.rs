use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use agentid_core::config::{AuthConfig, IamConfig, OidcConfig};
use agentid_core::credentials::{
    AccessToken, CredentialBundle, CredentialError, IdToken, RefreshToken,
};

use crate::session::{HandlerError, LogoutHandler, SessionHandlers, TokenExpiredHandler};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint rejected the request with status {status}")]
    TokenEndpoint { status: u16 },
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("{operation} is not supported by the {flow} flow")]
    NotSupported {
        operation: &'static str,
        flow: &'static str,
    },
    #[error("invalid authorize url: {0}")]
    AuthorizeUrl(#[from] url::ParseError),
}

/// Wire shape of the issuer's token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// The active auth flow, chosen once at startup from configuration.
///
/// Multi-tenant deployments authenticate against the shared IAM stack
/// (tenant switching, product roles); single-tenant deployments talk
/// straight to the customer's OIDC issuer. Both produce the same
/// [`CredentialBundle`] at this boundary, so nothing downstream —
/// transport, facades, provisioning — knows which flow is active.
pub enum AuthFlow {
    Iam(IamFlow),
    Oidc(OidcFlow),
}

pub struct IamFlow {
    http: reqwest::Client,
    config: IamConfig,
}

pub struct OidcFlow {
    http: reqwest::Client,
    config: OidcConfig,
}

impl AuthFlow {
    pub fn from_config(config: AuthConfig) -> Self {
        match config {
            AuthConfig::Iam(config) => AuthFlow::Iam(IamFlow {
                http: reqwest::Client::new(),
                config,
            }),
            AuthConfig::Oidc(config) => AuthFlow::Oidc(OidcFlow {
                http: reqwest::Client::new(),
                config,
            }),
        }
    }

    pub fn issuer(&self) -> &str {
        match self {
            AuthFlow::Iam(flow) => &flow.config.issuer,
            AuthFlow::Oidc(flow) => &flow.config.issuer,
        }
    }

    fn client_id(&self) -> &str {
        match self {
            AuthFlow::Iam(flow) => &flow.config.client_id,
            AuthFlow::Oidc(flow) => &flow.config.client_id,
        }
    }

    fn http(&self) -> &reqwest::Client {
        match self {
            AuthFlow::Iam(flow) => &flow.http,
            AuthFlow::Oidc(flow) => &flow.http,
        }
    }

    /// The browser entry point for the PKCE authorization-code flow.
    /// The IAM flow scopes the request to the product so the issued
    /// tokens carry tenant and product-role claims.
    pub fn authorize_url(
        &self,
        redirect_uri: &str,
        state: &str,
        code_challenge: &str,
    ) -> Result<String, ProviderError> {
        let mut url = Url::parse(&format!("{}/v1/authorize", self.issuer()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.client_id())
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", state);
        if let AuthFlow::Iam(flow) = self {
            url.query_pairs_mut()
                .append_pair("product", &flow.config.product_id);
        }
        Ok(url.into())
    }

    /// Exchange an authorization code for a credential bundle.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<CredentialBundle, ProviderError> {
        self.token_request(serde_json::json!({
            "grant_type": "authorization_code",
            "code": code,
            "code_verifier": code_verifier,
            "redirect_uri": redirect_uri,
            "client_id": self.client_id(),
        }))
        .await
    }

    /// Silent renewal. `Ok(None)` means the issuer rejected the
    /// refresh token — the session is over, not broken.
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<Option<CredentialBundle>, ProviderError> {
        let result = self
            .token_request(serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": refresh_token,
                "client_id": self.client_id(),
            }))
            .await;
        match result {
            Ok(bundle) => Ok(Some(bundle)),
            Err(ProviderError::TokenEndpoint { status }) => {
                tracing::info!(status, "refresh token rejected by issuer");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-authenticate the current session against another tenant.
    /// IAM only; the OIDC flow is single-tenant by definition.
    pub async fn switch_tenant(
        &self,
        refresh_token: &str,
        tenant_id: &str,
    ) -> Result<CredentialBundle, ProviderError> {
        let AuthFlow::Iam(flow) = self else {
            return Err(ProviderError::NotSupported {
                operation: "tenant switch",
                flow: "oidc",
            });
        };
        self.token_request(serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
            "client_id": self.client_id(),
            "tenant": tenant_id,
            "product": flow.config.product_id,
        }))
        .await
    }

    /// Best-effort token revocation at the issuer.
    pub async fn revoke(&self, token: &str) -> Result<(), ProviderError> {
        let response = self
            .http()
            .post(format!("{}/v1/revoke", self.issuer()))
            .json(&serde_json::json!({
                "token": token,
                "client_id": self.client_id(),
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::TokenEndpoint {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn token_request(
        &self,
        body: serde_json::Value,
    ) -> Result<CredentialBundle, ProviderError> {
        let response = self
            .http()
            .post(format!("{}/v1/token", self.issuer()))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::TokenEndpoint {
                status: status.as_u16(),
            });
        }
        let tokens: TokenEndpointResponse = response.json().await?;
        let bundle = CredentialBundle::from_tokens(
            Some(AccessToken::parse(tokens.access_token)?),
            Some(IdToken::parse(tokens.id_token)?),
            tokens.refresh_token.map(|token| RefreshToken { token }),
        )?;
        Ok(bundle)
    }
}

/// Provider-owned session store plus its flow. Owns the authoritative
/// credential bundle; API clients only ever receive copies through
/// provisioning fan-out.
pub struct AuthSession {
    flow: Arc<AuthFlow>,
    store: Arc<Mutex<Option<CredentialBundle>>>,
}

impl AuthSession {
    pub fn new(flow: AuthFlow) -> Self {
        Self {
            flow: Arc::new(flow),
            store: Arc::new(Mutex::new(None)),
        }
    }

    pub fn flow(&self) -> &AuthFlow {
        &self.flow
    }

    pub fn current(&self) -> Option<CredentialBundle> {
        self.lock_store().clone()
    }

    pub fn install(&self, bundle: CredentialBundle) {
        *self.lock_store() = Some(bundle);
    }

    pub fn clear(&self) {
        *self.lock_store() = None;
    }

    /// The handler pair the provisioning layer installs into every
    /// API client for this session.
    ///
    /// The renewal hook reads the refresh token from the store at call
    /// time (it may have rotated since wiring) and writes the renewed
    /// bundle back. The logout hook clears the store synchronously and
    /// fires revocation without awaiting it.
    pub fn handlers(&self) -> SessionHandlers {
        let flow = self.flow.clone();
        let store = self.store.clone();
        let token_expired: TokenExpiredHandler = Arc::new(move || {
            let flow = flow.clone();
            let store = store.clone();
            Box::pin(async move {
                let refresh_token = {
                    let guard = store.lock().unwrap_or_else(|e| e.into_inner());
                    guard
                        .as_ref()
                        .and_then(|bundle| bundle.refresh_token.clone())
                };
                let Some(refresh_token) = refresh_token else {
                    return Ok::<Option<CredentialBundle>, HandlerError>(None);
                };
                let renewed = flow.refresh(&refresh_token.token).await?;
                if let Some(bundle) = &renewed {
                    *store.lock().unwrap_or_else(|e| e.into_inner()) = Some(bundle.clone());
                }
                Ok(renewed)
            })
        });

        let flow = self.flow.clone();
        let store = self.store.clone();
        let logout: LogoutHandler = Arc::new(move |options| {
            let bundle = {
                let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
                if options.clear_tokens_before_redirect {
                    guard.take()
                } else {
                    guard.clone()
                }
            };
            // Revocation is fire-and-forget: the transport must not
            // wait on the issuer to finish a logout.
            if let Some(bundle) = bundle {
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let flow = flow.clone();
                    handle.spawn(async move {
                        if options.revoke_access_token {
                            if let Err(err) = flow.revoke(&bundle.access_token.token).await {
                                tracing::debug!(error = %err, "access token revocation failed");
                            }
                        }
                        if options.revoke_refresh_token {
                            if let Some(refresh) = &bundle.refresh_token {
                                if let Err(err) = flow.revoke(&refresh.token).await {
                                    tracing::debug!(error = %err, "refresh token revocation failed");
                                }
                            }
                        }
                    });
                }
            }
            Ok(())
        });

        SessionHandlers {
            token_expired: Some(token_expired),
            logout: Some(logout),
        }
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, Option<CredentialBundle>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}
