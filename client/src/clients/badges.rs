use std::sync::Arc;

use agentid_core::badge::{
    IssueA2aBadgeRequest, IssueBadgeResponse, IssueMcpBadgeRequest, VerifyBadgeRequest,
    VerifyBadgeResponse,
};

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for badge issuance and verification.
pub struct BadgeClient {
    api: Arc<ApiClient>,
}

impl BadgeClient {
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

    /// Issue a badge for an A2A agent discovered through its
    /// well-known URL.
    pub async fn issue_a2a_badge(
        &self,
        app_id: &str,
        request: &IssueA2aBadgeRequest,
    ) -> Result<IssueBadgeResponse, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post(format!("/apps/{app_id}/badges"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    /// Issue a badge for an MCP server by name and URL.
    pub async fn issue_mcp_badge(
        &self,
        app_id: &str,
        request: &IssueMcpBadgeRequest,
    ) -> Result<IssueBadgeResponse, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post(format!("/apps/{app_id}/badges"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn verify_badge(
        &self,
        request: &VerifyBadgeRequest,
    ) -> Result<VerifyBadgeResponse, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post("/badges/verify").with_body(serde_json::to_value(request)?),
            )
            .await
    }
}
