use std::sync::Arc;

use agentid_core::apps::{
    App, CreateAppRequest, CreateOasfAppRequest, CreateOasfAppResponse, GetAppsCountResponse,
    GetTasksResponse, ListAppsResponse, UpdateAppRequest,
};
use agentid_core::page::PageQuery;

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for the agentic-services domain: registering agents and MCP
/// servers, their lifecycle, API keys and task discovery.
pub struct AgenticServicesClient {
    api: Arc<ApiClient>,
}

impl AgenticServicesClient {
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

    pub async fn list_apps(&self, page: &PageQuery) -> Result<ListAppsResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/apps").with_query(page.to_pairs()))
            .await
    }

    pub async fn get_app(&self, app_id: &str) -> Result<App, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!("/apps/{app_id}")))
            .await
    }

    pub async fn create_app(&self, request: &CreateAppRequest) -> Result<App, ClientError> {
        self.api
            .execute_json(RequestSpec::post("/apps").with_body(serde_json::to_value(request)?))
            .await
    }

    pub async fn update_app(
        &self,
        app_id: &str,
        request: &UpdateAppRequest,
    ) -> Result<App, ClientError> {
        self.api
            .execute_json(
                RequestSpec::put(format!("/apps/{app_id}"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn delete_app(&self, app_id: &str) -> Result<(), ClientError> {
        self.api
            .execute(RequestSpec::delete(format!("/apps/{app_id}")))
            .await?;
        Ok(())
    }

    pub async fn get_apps_count(&self) -> Result<GetAppsCountResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/apps/all/count"))
            .await
    }

    /// Rotate the API key secret for a registered service.
    pub async fn refresh_api_key(&self, app_id: &str) -> Result<App, ClientError> {
        self.api
            .execute_json(RequestSpec::post(format!("/apps/{app_id}/api-key/refresh")))
            .await
    }

    /// Tasks callable across registered services, grouped by type.
    pub async fn get_tasks(&self) -> Result<GetTasksResponse, ClientError> {
        self.api.execute_json(RequestSpec::get("/tasks")).await
    }

    /// Register an OASF agent from its base64-encoded schema; returns
    /// the app together with its first issued badge.
    pub async fn create_oasf_app(
        &self,
        request: &CreateOasfAppRequest,
    ) -> Result<CreateOasfAppResponse, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post("/apps/oasf").with_body(serde_json::to_value(request)?),
            )
            .await
    }
}
