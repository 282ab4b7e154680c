use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use agentid_client::provider::{AuthFlow, AuthSession};
use agentid_client::{Analytics, ApiSet};
use agentid_core::config::{ApiEndpoints, AuthConfig};
use agentid_core::credentials::{AccessToken, CredentialBundle, IdToken, RefreshToken};

/// Stored credentials for the CLI
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub issuer: String,
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
    std::process::exit(1);
}

pub fn config_path() -> std::path::PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("agentid");
    config_dir.join("credentials.json")
}

pub fn load_credentials() -> Option<StoredCredentials> {
    let path = config_path();
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_credentials(creds: &StoredCredentials) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let data = serde_json::to_string_pretty(creds)?;

    // Write with restricted permissions (0o600)
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path)?;
    file.write_all(data.as_bytes())?;

    Ok(())
}

pub fn delete_credentials() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

impl StoredCredentials {
    pub fn from_bundle(issuer: &str, bundle: &CredentialBundle) -> Self {
        Self {
            issuer: issuer.to_string(),
            access_token: bundle.access_token.token.clone(),
            id_token: bundle.id_token.token.clone(),
            refresh_token: bundle.refresh_token.as_ref().map(|t| t.token.clone()),
            expires_at: bundle
                .access_token
                .expires_at
                .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1)),
        }
    }

    pub fn to_bundle(&self) -> Result<CredentialBundle, Box<dyn std::error::Error>> {
        let bundle = CredentialBundle::from_tokens(
            Some(AccessToken::parse(self.access_token.clone())?),
            Some(IdToken::parse(self.id_token.clone())?),
            self.refresh_token.clone().map(|token| RefreshToken { token }),
        )?;
        Ok(bundle)
    }
}

/// Resolve the current credential bundle (with auto-refresh):
/// stored credentials are renewed through the active flow when within
/// a 5-minute expiry buffer.
pub async fn resolve_bundle(
    flow: &AuthFlow,
) -> Result<CredentialBundle, Box<dyn std::error::Error>> {
    let Some(creds) = load_credentials() else {
        return Err("No credentials found. Run `agentid login`.".into());
    };

    // Check if the access token needs refresh (5-min buffer)
    let buffer = chrono::Duration::minutes(5);
    if Utc::now() + buffer >= creds.expires_at {
        let Some(refresh_token) = creds.refresh_token.as_deref() else {
            return Err("Access token expired and no refresh token is stored. Run `agentid login` again.".into());
        };
        match flow.refresh(refresh_token).await? {
            Some(bundle) => {
                save_credentials(&StoredCredentials::from_bundle(&creds.issuer, &bundle))?;
                return Ok(bundle);
            }
            None => {
                return Err(
                    "Access token expired and refresh failed. Run `agentid login` again.".into(),
                );
            }
        }
    }

    creds.to_bundle()
}

/// Telemetry sink that mirrors request events into the tracing log.
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track(
        &self,
        event: &str,
        properties: serde_json::Value,
    ) -> Result<(), agentid_client::analytics::AnalyticsError> {
        tracing::debug!(event, %properties, "analytics");
        Ok(())
    }
}

/// Everything a command needs: the provider-side session and the
/// provisioned client set.
pub struct Runtime {
    pub auth: AuthSession,
    pub apis: ApiSet,
}

/// Build the auth flow and the fully provisioned client set, resolving
/// stored credentials unless `anonymous` is set.
pub async fn build_runtime(anonymous: bool) -> Result<Runtime, Box<dyn std::error::Error>> {
    let config = AuthConfig::from_env()?;
    let endpoints = ApiEndpoints::from_env(&config);
    let product_id = match &config {
        AuthConfig::Iam(iam) => Some(iam.product_id.clone()),
        AuthConfig::Oidc(_) => None,
    };

    let auth = AuthSession::new(AuthFlow::from_config(config));
    let apis = ApiSet::new(&endpoints, product_id.as_deref());

    apis.set_token_expired_handlers(auth.handlers());
    apis.set_analytics(Some(std::sync::Arc::new(LogAnalytics)));

    if !anonymous {
        let bundle = resolve_bundle(auth.flow()).await?;
        auth.install(bundle.clone());
        apis.set_auth_info(Some(bundle));
    }

    Ok(Runtime { auth, apis })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a JSON value from a file path, or stdin when the path is '-'.
pub fn read_json_from_file(path: &str) -> Result<serde_json::Value, String> {
    let data = if path == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?
    };
    serde_json::from_str(&data).map_err(|e| format!("Invalid JSON in {path}: {e}"))
}
