use clap::Subcommand;

use agentid_core::apps::{AppType, CreateAppRequest, CreateOasfAppRequest, UpdateAppRequest};
use agentid_core::page::PageQuery;

use crate::util::{build_runtime, print_json, read_json_from_file};

#[derive(Subcommand)]
pub enum AppCommands {
    /// List registered agentic services
    List {
        #[arg(long)]
        page: Option<i32>,
        #[arg(long)]
        size: Option<i32>,
        /// Filter by name substring
        #[arg(long)]
        query: Option<String>,
    },
    /// Show one agentic service
    Show { app_id: String },
    /// Register an agentic service
    Create {
        #[arg(long)]
        name: String,
        /// Service type: a2a, oasf or mcp
        #[arg(long, value_parser = parse_app_type)]
        app_type: AppType,
        #[arg(long)]
        description: Option<String>,
    },
    /// Register an OASF agent from its base64-encoded schema file
    CreateOasf {
        /// File containing the base64 schema (use '-' for stdin)
        #[arg(long)]
        schema_file: String,
    },
    /// Update name/description of an agentic service
    Update {
        app_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an agentic service
    Delete { app_id: String },
    /// Per-type counts of registered services
    Count,
    /// Rotate the API key secret of a service
    RefreshKey { app_id: String },
    /// Discover callable tasks across registered services
    Tasks,
}

fn parse_app_type(value: &str) -> Result<AppType, String> {
    match value.to_ascii_lowercase().as_str() {
        "a2a" => Ok(AppType::AgentA2a),
        "oasf" => Ok(AppType::AgentOasf),
        "mcp" => Ok(AppType::McpServer),
        other => Err(format!("unknown app type '{other}' (expected a2a, oasf or mcp)")),
    }
}

pub async fn run(command: AppCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let apps = &runtime.apis.agentic_services;

    match command {
        AppCommands::List { page, size, query } => {
            let page = PageQuery { page, size, query };
            print_json(&apps.list_apps(&page).await?)
        }
        AppCommands::Show { app_id } => print_json(&apps.get_app(&app_id).await?),
        AppCommands::Create {
            name,
            app_type,
            description,
        } => {
            let request = CreateAppRequest {
                name,
                description,
                app_type,
            };
            print_json(&apps.create_app(&request).await?)
        }
        AppCommands::CreateOasf { schema_file } => {
            let schema = match read_json_from_file(&schema_file) {
                Ok(value) => value.as_str().map(str::to_string).ok_or_else(|| {
                    "Schema file must contain a JSON string with the base64 schema".to_string()
                })?,
                // Not JSON: treat the raw file content as the base64 blob.
                Err(_) => std::fs::read_to_string(&schema_file)?.trim().to_string(),
            };
            let request = CreateOasfAppRequest {
                schema_base64: schema,
            };
            print_json(&apps.create_oasf_app(&request).await?)
        }
        AppCommands::Update {
            app_id,
            name,
            description,
        } => {
            let request = UpdateAppRequest { name, description };
            print_json(&apps.update_app(&app_id, &request).await?)
        }
        AppCommands::Delete { app_id } => {
            apps.delete_app(&app_id).await?;
            print_json(&serde_json::json!({"status": "deleted", "app_id": app_id}))
        }
        AppCommands::Count => print_json(&apps.get_apps_count().await?),
        AppCommands::RefreshKey { app_id } => print_json(&apps.refresh_api_key(&app_id).await?),
        AppCommands::Tasks => print_json(&apps.get_tasks().await?),
    }
}
