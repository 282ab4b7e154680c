use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::PagedResponse;

/// Onboarding state of a user device. A device becomes active once
/// its push subscription is confirmed and can then receive approval
/// requests for rules that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    #[serde(rename = "DEVICE_STATUS_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "DEVICE_STATUS_PENDING")]
    Pending,
    #[serde(rename = "DEVICE_STATUS_ACTIVE")]
    Active,
}

/// A device enrolled for approving agentic-service task invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PagedResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_decodes_wire_shape() {
        let device: Device = serde_json::from_value(json!({
            "id": "dev-1",
            "name": "Pixel 9",
            "status": "DEVICE_STATUS_ACTIVE"
        }))
        .unwrap();
        assert_eq!(device.status, Some(DeviceStatus::Active));
    }
}
