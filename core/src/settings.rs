use serde::{Deserialize, Serialize};

/// Supported identity-provider integrations for the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdpType {
    #[serde(rename = "IDP_TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "IDP_TYPE_DUO")]
    Duo,
    #[serde(rename = "IDP_TYPE_OKTA")]
    Okta,
    #[serde(rename = "IDP_TYPE_ORY")]
    Ory,
    #[serde(rename = "IDP_TYPE_SELF")]
    SelfIssued,
    #[serde(rename = "IDP_TYPE_KEYCLOAK")]
    Keycloak,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuoIdpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OktaIdpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OryIdpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakIdpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Issuer configuration: which IdP backs badge issuance for this
/// tenant, with exactly one per-IdP settings block populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    pub idp_type: IdpType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duo_idp_settings: Option<DuoIdpSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub okta_idp_settings: Option<OktaIdpSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ory_idp_settings: Option<OryIdpSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keycloak_idp_settings: Option<KeycloakIdpSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetIssuerRequest {
    pub issuer_settings: IssuerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetApiKeyRequest {
    pub api_key: String,
}

/// Tenant-level identity settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_settings: Option<IssuerSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issuer_settings_decode() {
        let settings: Settings = serde_json::from_value(json!({
            "apiKey": {"apiKey": "sk-123"},
            "issuerSettings": {
                "issuerId": "iss-1",
                "idpType": "IDP_TYPE_OKTA",
                "oktaIdpSettings": {"orgUrl": "https://acme.okta.com", "clientId": "c1"}
            }
        }))
        .unwrap();
        let issuer = settings.issuer_settings.unwrap();
        assert_eq!(issuer.idp_type, IdpType::Okta);
        assert!(issuer.okta_idp_settings.is_some());
        assert!(issuer.duo_idp_settings.is_none());
    }
}
