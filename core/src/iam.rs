use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant (organization) of the multi-tenant IAM service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTenantsResponse {
    #[serde(default)]
    pub tenants: Vec<TenantRecord>,
}

/// The IAM view of the current session: who is signed in, against
/// which tenant, with which roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A user group inside a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetGroupsTenantResponse {
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamUser {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetUsersGroupsResponse {
    #[serde(default)]
    pub users: Vec<IamUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteUserPayload {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: String,
}

/// Body for removing a user from a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveUserPayload {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_decodes_wire_shape() {
        let session: GetSessionResponse = serde_json::from_value(json!({
            "username": "jdoe",
            "tenantId": "t-1",
            "tenantName": "Acme",
            "roles": ["admin"]
        }))
        .unwrap();
        assert_eq!(session.tenant_id.as_deref(), Some("t-1"));
        assert_eq!(session.roles, vec!["admin"]);
    }
}
