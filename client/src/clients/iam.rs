use std::sync::Arc;

use agentid_core::iam::{
    GetGroupsTenantResponse, GetSessionResponse, GetTenantsResponse, GetUsersGroupsResponse,
    InviteUserPayload, RemoveUserPayload, TenantRecord, UpdateTenantRequest,
};

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for the multi-tenant IAM service: tenants, groups, users
/// and the current session. Only wired on the IAM flow. Tenant and
/// invite operations are scoped to the product this console manages.
pub struct IamClient {
    api: Arc<ApiClient>,
    product_id: String,
}

impl IamClient {
    pub fn new(base_url: &str, product_id: impl Into<String>) -> Self {
        Self {
            api: Arc::new(ApiClient::new(base_url, AuthPolicy::default())),
            product_id: product_id.into(),
        }
    }

    pub fn transport(&self) -> &ApiClient {
        &self.api
    }

    pub async fn get_session(&self) -> Result<GetSessionResponse, ClientError> {
        self.api.execute_json(RequestSpec::get("/session")).await
    }

    pub async fn get_tenants(&self) -> Result<GetTenantsResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/tenant").with_param("product", &self.product_id))
            .await
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> Result<TenantRecord, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!("/tenant/{tenant_id}")))
            .await
    }

    /// Create a tenant owned by the calling user.
    pub async fn create_tenant(&self) -> Result<TenantRecord, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post("/tenant/user").with_param("product", &self.product_id),
            )
            .await
    }

    pub async fn update_tenant(
        &self,
        tenant_id: &str,
        name: impl Into<String>,
    ) -> Result<TenantRecord, ClientError> {
        let payload = UpdateTenantRequest { name: name.into() };
        self.api
            .execute_json(
                RequestSpec::put(format!("/tenant/{tenant_id}"))
                    .with_body(serde_json::to_value(&payload)?),
            )
            .await
    }

    pub async fn delete_tenant(&self, tenant_id: &str) -> Result<TenantRecord, ClientError> {
        self.api
            .execute_json(RequestSpec::delete(format!("/tenant/{tenant_id}")))
            .await
    }

    pub async fn get_groups_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<GetGroupsTenantResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!("/tenant/{tenant_id}/group")))
            .await
    }

    pub async fn get_users_groups(
        &self,
        group_id: &str,
    ) -> Result<GetUsersGroupsResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/user").with_param("group", group_id))
            .await
    }

    pub async fn invite_user(
        &self,
        group_id: &str,
        payload: &InviteUserPayload,
    ) -> Result<(), ClientError> {
        self.api
            .execute(
                RequestSpec::post("/user/request/invite")
                    .with_param("product", &self.product_id)
                    .with_param("group", group_id)
                    .with_body(serde_json::to_value(payload)?),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_user(&self, tenant_id: &str, username: &str) -> Result<(), ClientError> {
        let payload = RemoveUserPayload {
            username: username.to_string(),
        };
        self.api
            .execute(
                RequestSpec::delete(format!("/tenant/{tenant_id}/user"))
                    .with_body(serde_json::to_value(&payload)?),
            )
            .await?;
        Ok(())
    }
}
