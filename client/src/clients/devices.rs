use std::sync::Arc;

use agentid_core::devices::{Device, ListDevicesResponse, RegisterDeviceRequest};
use agentid_core::page::PageQuery;

use crate::transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};

/// Client for device onboarding. Devices receive approval requests
/// for rules that require them.
pub struct DevicesClient {
    api: Arc<ApiClient>,
}

impl DevicesClient {
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

    pub async fn list_devices(&self, page: &PageQuery) -> Result<ListDevicesResponse, ClientError> {
        self.api
            .execute_json(RequestSpec::get("/devices").with_query(page.to_pairs()))
            .await
    }

    pub async fn get_device(&self, device_id: &str) -> Result<Device, ClientError> {
        self.api
            .execute_json(RequestSpec::get(format!("/devices/{device_id}")))
            .await
    }

    pub async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<Device, ClientError> {
        self.api
            .execute_json(RequestSpec::post("/devices").with_body(serde_json::to_value(request)?))
            .await
    }

    pub async fn delete_device(&self, device_id: &str) -> Result<(), ClientError> {
        self.api
            .execute(RequestSpec::delete(format!("/devices/{device_id}")))
            .await?;
        Ok(())
    }
}
