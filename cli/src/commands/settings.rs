use clap::Subcommand;

use agentid_core::settings::{IssuerSettings, SetApiKeyRequest, SetIssuerRequest};

use crate::util::{build_runtime, print_json, read_json_from_file};

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show tenant identity settings
    Show,
    /// Set the identity service API key
    SetApiKey {
        #[arg(long)]
        api_key: String,
    },
    /// Configure the badge issuer from a JSON settings file
    SetIssuer {
        /// IssuerSettings JSON (use '-' for stdin)
        #[arg(long)]
        file: String,
    },
}

pub async fn run(command: SettingsCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let settings = &runtime.apis.settings;

    match command {
        SettingsCommands::Show => print_json(&settings.get_settings().await?),
        SettingsCommands::SetApiKey { api_key } => {
            print_json(&settings.set_api_key(&SetApiKeyRequest { api_key }).await?)
        }
        SettingsCommands::SetIssuer { file } => {
            let value = read_json_from_file(&file)?;
            let issuer_settings: IssuerSettings = serde_json::from_value(value)?;
            print_json(&settings.set_up_issuer(&SetIssuerRequest { issuer_settings }).await?)
        }
    }
}
