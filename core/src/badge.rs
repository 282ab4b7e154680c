use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content of a badge verifiable credential: the subject identifier
/// plus the badged document itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BadgeClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The content of the badge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Data-integrity proof attached to a verifiable credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

/// W3C Verifiable Credential data model, restricted to the fields the
/// badge service emits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub credential_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<BadgeClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_schema: Vec<CredentialSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// A badge binding an agentic service to a verifiable credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable_credential: Option<VerifiableCredential>,
    #[serde(rename = "appID", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

/// Issue a badge for an A2A agent discovered via its well-known URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueA2aBadgeRequest {
    pub well_known_url: String,
}

/// Issue a badge for an MCP server by name and URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueMcpBadgeRequest {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueBadgeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyBadgeRequest {
    pub badge: Badge,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyBadgeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
