use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims the console consumes from access and id tokens issued by the
/// identity service. Unknown claims are ignored on decode — the token
/// stays opaque apart from these.
///
/// `product_roles` arrives either as a single string or as an array,
/// depending on how the tenant's IdP maps group membership. Both forms
/// are accepted and normalized in [`User`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub product_roles: Option<ProductRoles>,
    #[serde(default)]
    pub customer_support: Option<bool>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    /// Expiry as seconds since the epoch, per RFC 7519.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Role claim that is a string for single-role users and an array when
/// the IdP grants several product roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRoles {
    One(String),
    Many(Vec<String>),
}

/// Bearer token used on every API request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub claims: TokenClaims,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Identity token. Carries the same claim set; used as a fallback
/// source for tenant and role claims when the access token omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdToken {
    pub token: String,
    pub claims: TokenClaims,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Opaque renewal token. Never parsed, never attached to requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
}

/// Tenant identity derived from token claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Projection of the signed-in user, derived once at bundle
/// construction so UI/CLI code never touches raw claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, when the IdP provides given/family names.
    pub name: Option<String>,
    /// Token subject.
    pub username: Option<String>,
    pub tenant: Tenant,
    /// Single product role, when the claim is a string.
    pub product_role: Option<String>,
    /// All product roles, when the claim is an array.
    pub all_product_roles: Vec<String>,
    pub is_customer_support: bool,
}

/// The authoritative record of the current session: tokens plus the
/// derived user projection.
///
/// A bundle is either fully populated or it does not exist. Partial
/// states (an access token without an id token, tokens without a user)
/// are construction errors, never stored values — which is why the
/// fields here are not `Option`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub access_token: AccessToken,
    pub id_token: IdToken,
    /// Absent for customer-support sessions: elevated-trust sessions
    /// must not be silently renewable, so the constructor drops the
    /// refresh token whenever the `customer_support` claim is set.
    pub refresh_token: Option<RefreshToken>,
    pub is_authenticated: bool,
    pub user: User,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential bundle is missing {missing}")]
    Incomplete { missing: &'static str },
    #[error("malformed token: {reason}")]
    MalformedToken { reason: String },
    #[error("token claims did not decode: {0}")]
    Claims(#[from] serde_json::Error),
}

impl AccessToken {
    pub fn parse(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let (claims, expires_at) = decode_claims(&token)?;
        Ok(Self {
            token,
            claims,
            expires_at,
        })
    }
}

impl IdToken {
    pub fn parse(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let (claims, expires_at) = decode_claims(&token)?;
        Ok(Self {
            token,
            claims,
            expires_at,
        })
    }
}

impl CredentialBundle {
    /// Assemble a bundle from freshly issued tokens.
    ///
    /// All-or-nothing: both the access and the id token must be
    /// present or this fails with [`CredentialError::Incomplete`].
    /// The user projection is derived from the claims, preferring the
    /// access token and falling back to the id token field by field.
    pub fn from_tokens(
        access_token: Option<AccessToken>,
        id_token: Option<IdToken>,
        refresh_token: Option<RefreshToken>,
    ) -> Result<Self, CredentialError> {
        let access_token = access_token.ok_or(CredentialError::Incomplete {
            missing: "access token",
        })?;
        let id_token = id_token.ok_or(CredentialError::Incomplete {
            missing: "id token",
        })?;

        let user = derive_user(&access_token.claims, &id_token.claims);
        let refresh_token = if user.is_customer_support {
            None
        } else {
            refresh_token
        };

        Ok(Self {
            access_token,
            id_token,
            refresh_token,
            is_authenticated: true,
            user,
        })
    }

    /// The raw bearer string attached to requests.
    pub fn bearer(&self) -> &str {
        &self.access_token.token
    }
}

/// Build the [`User`] projection from token claims. The access token
/// wins; the id token fills whatever it left blank.
fn derive_user(access: &TokenClaims, id: &TokenClaims) -> User {
    let mut user = User::default();

    let given = access.given_name.as_ref().or(id.given_name.as_ref());
    let family = access.family_name.as_ref().or(id.family_name.as_ref());
    if let (Some(given), Some(family)) = (given, family) {
        user.name = Some(format!("{given} {family}"));
    }

    user.username = access.sub.clone().or_else(|| id.sub.clone());

    let tenant_source = if access.tenant_name.is_some() {
        access
    } else {
        id
    };
    user.tenant = Tenant {
        id: tenant_source.tenant.clone(),
        name: tenant_source.tenant_name.clone(),
    };

    let roles = access.product_roles.as_ref().or(id.product_roles.as_ref());
    match roles {
        Some(ProductRoles::One(role)) => user.product_role = Some(role.clone()),
        Some(ProductRoles::Many(roles)) => user.all_product_roles = roles.clone(),
        None => {}
    }

    user.is_customer_support = access
        .customer_support
        .or(id.customer_support)
        .unwrap_or(false);

    user
}

/// Decode the claims segment of a JWT without verifying the signature.
/// Verification is the backend's job; the console only projects claims
/// it received from its own issuer.
fn decode_claims(token: &str) -> Result<(TokenClaims, Option<DateTime<Utc>>), CredentialError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| CredentialError::MalformedToken {
            reason: "expected three dot-separated segments".to_string(),
        })?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| CredentialError::MalformedToken {
            reason: format!("claims segment is not base64url: {e}"),
        })?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)?;
    let expires_at = claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single());
    Ok((claims, expires_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_jwt(claims: serde_json::Value) -> String {
        let b64 = |v: &serde_json::Value| {
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(v.to_string())
        };
        let header = json!({"alg": "RS256", "typ": "JWT"});
        format!("{}.{}.sig", b64(&header), b64(&claims))
    }

    fn access(claims: serde_json::Value) -> AccessToken {
        AccessToken::parse(make_jwt(claims)).unwrap()
    }

    fn id(claims: serde_json::Value) -> IdToken {
        IdToken::parse(make_jwt(claims)).unwrap()
    }

    #[test]
    fn bundle_requires_both_tokens() {
        let err = CredentialBundle::from_tokens(Some(access(json!({"sub": "u"}))), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Incomplete { missing: "id token" }
        ));

        let err = CredentialBundle::from_tokens(None, Some(id(json!({"sub": "u"}))), None)
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Incomplete {
                missing: "access token"
            }
        ));
    }

    #[test]
    fn user_is_derived_from_claims() {
        let bundle = CredentialBundle::from_tokens(
            Some(access(json!({
                "sub": "jdoe",
                "tenant": "t-1",
                "tenant_name": "Acme",
                "product_roles": "admin",
                "given_name": "Jane",
                "family_name": "Doe"
            }))),
            Some(id(json!({"sub": "jdoe"}))),
            Some(RefreshToken {
                token: "rt".to_string(),
            }),
        )
        .unwrap();

        assert_eq!(bundle.user.name.as_deref(), Some("Jane Doe"));
        assert_eq!(bundle.user.username.as_deref(), Some("jdoe"));
        assert_eq!(bundle.user.tenant.id.as_deref(), Some("t-1"));
        assert_eq!(bundle.user.tenant.name.as_deref(), Some("Acme"));
        assert_eq!(bundle.user.product_role.as_deref(), Some("admin"));
        assert!(bundle.refresh_token.is_some());
        assert!(bundle.is_authenticated);
    }

    #[test]
    fn tenant_falls_back_to_id_token() {
        let bundle = CredentialBundle::from_tokens(
            Some(access(json!({"sub": "jdoe"}))),
            Some(id(json!({"tenant": "t-2", "tenant_name": "Beta"}))),
            None,
        )
        .unwrap();
        assert_eq!(bundle.user.tenant.id.as_deref(), Some("t-2"));
        assert_eq!(bundle.user.tenant.name.as_deref(), Some("Beta"));
    }

    #[test]
    fn role_array_claim_is_normalized() {
        let bundle = CredentialBundle::from_tokens(
            Some(access(json!({"sub": "u", "product_roles": ["viewer", "editor"]}))),
            Some(id(json!({}))),
            None,
        )
        .unwrap();
        assert!(bundle.user.product_role.is_none());
        assert_eq!(bundle.user.all_product_roles, vec!["viewer", "editor"]);
    }

    #[test]
    fn customer_support_drops_refresh_token() {
        let bundle = CredentialBundle::from_tokens(
            Some(access(json!({"sub": "cs", "customer_support": true}))),
            Some(id(json!({}))),
            Some(RefreshToken {
                token: "rt".to_string(),
            }),
        )
        .unwrap();
        assert!(bundle.user.is_customer_support);
        assert!(bundle.refresh_token.is_none());
    }

    #[test]
    fn exp_claim_becomes_expiry() {
        let token = access(json!({"sub": "u", "exp": 1_700_000_000}));
        assert_eq!(
            token.expires_at,
            Utc.timestamp_opt(1_700_000_000, 0).single()
        );
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(AccessToken::parse("not-a-jwt").is_err());
        assert!(AccessToken::parse("a.%%%.c").is_err());
    }
}
