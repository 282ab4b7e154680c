use std::sync::Arc;

use agentid_core::config::ApiEndpoints;
use agentid_core::credentials::CredentialBundle;

use crate::analytics::Analytics;
use crate::clients::{
    AgenticServicesClient, BadgeClient, DevicesClient, IamClient, PolicyClient, SettingsClient,
};
use crate::session::SessionHandlers;
use crate::transport::ApiClient;

/// The full set of domain clients, provisioned together.
///
/// Every credential change (login, silent renewal, logout, tenant
/// switch) fans out to all clients from here, so no client ever holds
/// a stale view of the session. The IAM client only exists on the IAM
/// flow, where an IAM host is configured.
pub struct ApiSet {
    pub iam: Option<IamClient>,
    pub settings: SettingsClient,
    pub agentic_services: AgenticServicesClient,
    pub policies: PolicyClient,
    pub badges: BadgeClient,
    pub devices: DevicesClient,
}

impl ApiSet {
    pub fn new(endpoints: &ApiEndpoints, product_id: Option<&str>) -> Self {
        let identity = &endpoints.identity_api;
        Self {
            iam: endpoints.iam_api.as_deref().map(|iam_api| {
                IamClient::new(iam_api, product_id.unwrap_or_default())
            }),
            settings: SettingsClient::new(identity),
            agentic_services: AgenticServicesClient::new(identity),
            policies: PolicyClient::new(identity),
            badges: BadgeClient::new(identity),
            devices: DevicesClient::new(identity),
        }
    }

    /// Propagate a credential change to every client.
    pub fn set_auth_info(&self, bundle: Option<CredentialBundle>) {
        self.for_each_transport(|api| api.set_auth_info(bundle.clone()));
    }

    /// Install the active flow's renewal/logout hooks on every client.
    pub fn set_token_expired_handlers(&self, handlers: SessionHandlers) {
        self.for_each_transport(|api| api.set_token_expired_handlers(handlers.clone()));
    }

    /// Install (or clear) the telemetry sink on every client.
    pub fn set_analytics(&self, analytics: Option<Arc<dyn Analytics>>) {
        self.for_each_transport(|api| api.set_analytics(analytics.clone()));
    }

    fn for_each_transport(&self, f: impl Fn(&ApiClient)) {
        if let Some(iam) = &self.iam {
            f(iam.transport());
        }
        f(self.settings.transport());
        f(self.agentic_services.transport());
        f(self.policies.transport());
        f(self.badges.transport());
        f(self.devices.transport());
    }
}
