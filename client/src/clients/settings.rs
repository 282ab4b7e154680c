use std::sync::Arc;

use agentid_core::settings::{ApiKey, SetApiKeyRequest, SetIssuerRequest, Settings};

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for tenant identity settings: issuer/IdP configuration and
/// the service API key.
pub struct SettingsClient {
    api: Arc<ApiClient>,
}

impl SettingsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            api: Arc::new(ApiClient::new(
                format!("{base_url}/v1alpha1"),
                AuthPolicy::default(),
            )),
        }
    }

    pub fn transport(&self) -> &ApiClient {
        &self.api
    }

    pub async fn get_settings(&self) -> Result<Settings, ClientError> {
        self.api.execute_json(RequestSpec::get("/settings")).await
    }

    pub async fn set_up_issuer(&self, request: &SetIssuerRequest) -> Result<Settings, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post("/settings/issuer").with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn set_api_key(&self, request: &SetApiKeyRequest) -> Result<ApiKey, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post("/settings/api-key").with_body(serde_json::to_value(request)?),
            )
            .await
    }
}
