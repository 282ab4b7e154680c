use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badge::Badge;
use crate::page::PagedResponse;

/// Kind of agentic service registered with the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppType {
    #[serde(rename = "APP_TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "APP_TYPE_AGENT_A2A")]
    AgentA2a,
    #[serde(rename = "APP_TYPE_AGENT_OASF")]
    AgentOasf,
    #[serde(rename = "APP_TYPE_MCP_SERVER")]
    McpServer,
}

/// Badge-derived lifecycle status: active while at least one badge is
/// valid, pending with no badges, revoked once all badges are revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppStatus {
    #[serde(rename = "APP_STATUS_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "APP_STATUS_ACTIVE")]
    Active,
    #[serde(rename = "APP_STATUS_PENDING")]
    Pending,
    #[serde(rename = "APP_STATUS_REVOKED")]
    Revoked,
}

/// An agentic service (agent or MCP server) known to the identity
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub app_type: AppType,
    /// The DID value backing this service's identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver_metadata_id: Option<String>,
    /// API key secret, present only on creation responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub app_type: AppType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppsResponse {
    #[serde(default)]
    pub apps: Vec<App>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PagedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTypeCountEntry {
    pub key: AppType,
    /// int64 on the wire, serialized as a string.
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetAppsCountResponse {
    #[serde(default)]
    pub counts: Vec<AppTypeCountEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

/// A callable task exposed by an agentic service (e.g. an MCP tool).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Tasks grouped per agentic-service type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTasksResponse {
    #[serde(default)]
    pub result: HashMap<String, TaskList>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOasfAppRequest {
    /// The OASF schema in a base64 encoded format
    pub schema_base64: String,
}

/// OASF creation returns the app together with its first issued badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOasfAppResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn app_decodes_wire_shape() {
        let app: App = serde_json::from_value(json!({
            "id": "app-1",
            "name": "weather-agent",
            "type": "APP_TYPE_AGENT_A2A",
            "resolverMetadataId": "did:example:123",
            "status": "APP_STATUS_ACTIVE"
        }))
        .unwrap();
        assert_eq!(app.app_type, AppType::AgentA2a);
        assert_eq!(app.status, Some(AppStatus::Active));
        assert_eq!(app.resolver_metadata_id.as_deref(), Some("did:example:123"));
    }

    #[test]
    fn list_response_defaults_to_empty() {
        let list: ListAppsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(list.apps.is_empty());
        assert!(list.pagination.is_none());
    }
}
