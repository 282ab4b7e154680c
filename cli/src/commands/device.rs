use clap::Subcommand;

use agentid_core::devices::RegisterDeviceRequest;
use agentid_core::page::PageQuery;

use crate::util::{build_runtime, print_json};

#[derive(Subcommand)]
pub enum DeviceCommands {
    /// List enrolled devices
    List {
        #[arg(long)]
        page: Option<i32>,
        #[arg(long)]
        size: Option<i32>,
    },
    /// Show one device
    Show { device_id: String },
    /// Enroll a device for approval notifications
    Register {
        #[arg(long)]
        name: String,
    },
    /// Remove a device
    Delete { device_id: String },
}

pub async fn run(command: DeviceCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let devices = &runtime.apis.devices;

    match command {
        DeviceCommands::List { page, size } => {
            let page = PageQuery {
                page,
                size,
                query: None,
            };
            print_json(&devices.list_devices(&page).await?)
        }
        DeviceCommands::Show { device_id } => print_json(&devices.get_device(&device_id).await?),
        DeviceCommands::Register { name } => {
            print_json(&devices.register_device(&RegisterDeviceRequest { name }).await?)
        }
        DeviceCommands::Delete { device_id } => {
            devices.delete_device(&device_id).await?;
            print_json(&serde_json::json!({"status": "deleted", "device_id": device_id}))
        }
    }
}
