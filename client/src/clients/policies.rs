use std::sync::Arc;

use agentid_core::page::PageQuery;
use agentid_core::policy::{
    CreatePolicyRequest, GetPoliciesCountResponse, ListPoliciesResponse, ListRulesResponse,
    Policy, Rule, RuleBody, UpdatePolicyRequest,
};

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for access policies and their rules.
pub struct PolicyClient {
    api: Arc<ApiClient>,
}

impl PolicyClient {
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

    pub async fn list_policies(
        &self,
        page: &PageQuery,
    ) -> Result<ListPoliciesResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/policies").with_query(page.to_pairs()))
            .await
    }

    pub async fn get_policy(&self, policy_id: &str) -> Result<Policy, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!("/policies/{policy_id}")))
            .await
    }

    pub async fn create_policy(&self, request: &CreatePolicyRequest) -> Result<Policy, ClientError> {
        self.api
            .execute_json(RequestSpec::post("/policies").with_body(serde_json::to_value(request)?))
            .await
    }

    pub async fn update_policy(
        &self,
        policy_id: &str,
        request: &UpdatePolicyRequest,
    ) -> Result<Policy, ClientError> {
        self.api
            .execute_json(
                RequestSpec::put(format!("/policies/{policy_id}"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn delete_policy(&self, policy_id: &str) -> Result<(), ClientError> {
        self.api
            .execute(RequestSpec::delete(format!("/policies/{policy_id}")))
            .await?;
        Ok(())
    }

    pub async fn get_policies_count(&self) -> Result<GetPoliciesCountResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/policies/all/count"))
            .await
    }

    pub async fn list_rules(
        &self,
        policy_id: &str,
        page: &PageQuery,
    ) -> Result<ListRulesResponse, ClientError> {
        self.api
            .execute_json(
                RequestSpec::get(format!("/policies/{policy_id}/rules"))
                    .with_query(page.to_pairs()),
            )
            .await
    }

    pub async fn get_rule(&self, policy_id: &str, rule_id: &str) -> Result<Rule, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!(
                "/policies/{policy_id}/rules/{rule_id}"
            )))
            .await
    }

    pub async fn create_rule(
        &self,
        policy_id: &str,
        request: &RuleBody,
    ) -> Result<Rule, ClientError> {
        self.api
            .execute_json(
                RequestSpec::post(format!("/policies/{policy_id}/rules"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn update_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        request: &RuleBody,
    ) -> Result<Rule, ClientError> {
        self.api
            .execute_json(
                RequestSpec::put(format!("/policies/{policy_id}/rules/{rule_id}"))
                    .with_body(serde_json::to_value(request)?),
            )
            .await
    }

    pub async fn delete_rule(&self, policy_id: &str, rule_id: &str) -> Result<(), ClientError> {
        self.api
            .execute(RequestSpec::delete(format!(
                "/policies/{policy_id}/rules/{rule_id}"
            )))
            .await?;
        Ok(())
    }
}
