use thiserror::Error;

pub const AUTH_KIND_ENV: &str = "AGENTID_AUTH_TYPE";
pub const API_URL_ENV: &str = "AGENTID_API_URL";
pub const IAM_UI_ENV: &str = "AGENTID_IAM_UI";
pub const IAM_API_ENV: &str = "AGENTID_IAM_API";
pub const PRODUCT_ID_ENV: &str = "AGENTID_PRODUCT_ID";
pub const ISSUER_ENV: &str = "AGENTID_ISSUER";
pub const CLIENT_ID_ENV: &str = "AGENTID_CLIENT_ID";
pub const OIDC_UI_ENV: &str = "AGENTID_OIDC_UI";

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Which auth flow the deployment runs. Multi-tenant installs use the
/// IAM flow (tenant switching, product roles); single-tenant installs
/// use plain OIDC against the customer's own issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Iam,
    Oidc,
}

impl std::str::FromStr for AuthKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iam" => Ok(AuthKind::Iam),
            "oidc" => Ok(AuthKind::Oidc),
            other => Err(ConfigError::UnknownAuthKind {
                value: other.to_string(),
            }),
        }
    }
}

/// Multi-tenant IAM flow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamConfig {
    pub iam_ui: String,
    pub iam_api: String,
    pub product_id: String,
    pub issuer: String,
    pub client_id: String,
}

/// Single-tenant OIDC flow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcConfig {
    pub oidc_ui: String,
    pub issuer: String,
    pub client_id: String,
}

/// Auth flow configuration, one variant per flow. All string values
/// are whitespace-trimmed and base URLs lose their trailing slash; a
/// blank required value is a hard error, not an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Iam(IamConfig),
    Oidc(OidcConfig),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {var}")]
    Missing { var: &'static str },
    #[error("unknown AGENTID_AUTH_TYPE: '{value}' (expected 'iam' or 'oidc')")]
    UnknownAuthKind { value: String },
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. `from_env` delegates
    /// here; tests pass a map instead of mutating the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind: AuthKind = required(&lookup, AUTH_KIND_ENV)?.parse()?;
        match kind {
            AuthKind::Iam => Ok(AuthConfig::Iam(IamConfig {
                iam_ui: base_url(required(&lookup, IAM_UI_ENV)?),
                iam_api: base_url(required(&lookup, IAM_API_ENV)?),
                product_id: required(&lookup, PRODUCT_ID_ENV)?,
                issuer: base_url(required(&lookup, ISSUER_ENV)?),
                client_id: required(&lookup, CLIENT_ID_ENV)?,
            })),
            AuthKind::Oidc => Ok(AuthConfig::Oidc(OidcConfig {
                oidc_ui: base_url(required(&lookup, OIDC_UI_ENV)?),
                issuer: base_url(required(&lookup, ISSUER_ENV)?),
                client_id: required(&lookup, CLIENT_ID_ENV)?,
            })),
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            AuthConfig::Iam(_) => AuthKind::Iam,
            AuthConfig::Oidc(_) => AuthKind::Oidc,
        }
    }

    pub fn issuer(&self) -> &str {
        match self {
            AuthConfig::Iam(c) => &c.issuer,
            AuthConfig::Oidc(c) => &c.issuer,
        }
    }

    pub fn client_id(&self) -> &str {
        match self {
            AuthConfig::Iam(c) => &c.client_id,
            AuthConfig::Oidc(c) => &c.client_id,
        }
    }

    /// Tenant switching only exists on the IAM flow.
    pub fn is_multi_tenant(&self) -> bool {
        matches!(self, AuthConfig::Iam(_))
    }
}

/// Base URLs of the backend APIs the domain clients talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Identity service host (agentic services, policies, settings,
    /// badges, devices).
    pub identity_api: String,
    /// IAM host for tenant/user administration; only set on the IAM
    /// flow.
    pub iam_api: Option<String>,
}

impl ApiEndpoints {
    pub fn from_env(auth: &AuthConfig) -> Self {
        Self::from_lookup(auth, |var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(auth: &AuthConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity_api = lookup(API_URL_ENV)
            .map(base_url)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let iam_api = match auth {
            AuthConfig::Iam(c) => Some(c.iam_api.clone()),
            AuthConfig::Oidc(_) => None,
        };
        Self {
            identity_api,
            iam_api,
        }
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { var })
}

fn base_url(value: String) -> String {
    value.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |var| map.get(var).map(|v| v.to_string())
    }

    #[test]
    fn iam_config_trims_and_normalizes() {
        let cfg = AuthConfig::from_lookup(lookup(&[
            (AUTH_KIND_ENV, " iam "),
            (IAM_UI_ENV, "https://iam.example.com/ "),
            (IAM_API_ENV, " https://iam-api.example.com//"),
            (PRODUCT_ID_ENV, "prod-1"),
            (ISSUER_ENV, "https://issuer.example.com/"),
            (CLIENT_ID_ENV, "client-1"),
        ]))
        .unwrap();

        let AuthConfig::Iam(iam) = &cfg else {
            panic!("expected IAM config");
        };
        assert_eq!(iam.iam_ui, "https://iam.example.com");
        assert_eq!(iam.iam_api, "https://iam-api.example.com");
        assert_eq!(cfg.issuer(), "https://issuer.example.com");
        assert!(cfg.is_multi_tenant());
    }

    #[test]
    fn blank_required_field_is_missing() {
        let err = AuthConfig::from_lookup(lookup(&[
            (AUTH_KIND_ENV, "oidc"),
            (OIDC_UI_ENV, "   "),
            (ISSUER_ENV, "https://issuer.example.com"),
            (CLIENT_ID_ENV, "client-1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var: OIDC_UI_ENV }));
    }

    #[test]
    fn unknown_auth_kind_is_rejected() {
        let err =
            AuthConfig::from_lookup(lookup(&[(AUTH_KIND_ENV, "saml")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAuthKind { .. }));
    }

    #[test]
    fn endpoints_default_api_url() {
        let cfg = AuthConfig::from_lookup(lookup(&[
            (AUTH_KIND_ENV, "oidc"),
            (OIDC_UI_ENV, "https://ui.example.com"),
            (ISSUER_ENV, "https://issuer.example.com"),
            (CLIENT_ID_ENV, "client-1"),
        ]))
        .unwrap();
        let endpoints = ApiEndpoints::from_lookup(&cfg, |_| None);
        assert_eq!(endpoints.identity_api, DEFAULT_API_URL);
        assert!(endpoints.iam_api.is_none());
    }
}
