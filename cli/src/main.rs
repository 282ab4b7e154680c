use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod util;

use commands::api::ApiArgs;
use commands::app::AppCommands;
use commands::badge::BadgeCommands;
use commands::device::DeviceCommands;
use commands::policy::PolicyCommands;
use commands::settings::SettingsCommands;
use commands::tenant::TenantCommands;
use util::exit_error;

#[derive(Parser)]
#[command(
    name = "agentid",
    version,
    about = "Agent Identity CLI — administer agentic services, access policies, badges, devices and tenants"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate via the configured issuer (PKCE + browser)
    Login,
    /// Revoke and delete stored credentials
    Logout,
    /// Show the current session
    Session,
    /// Tenant administration (IAM flow only)
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },
    /// Agentic service registration and lifecycle
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
    /// Access policies and rules
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Device onboarding
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
    /// Tenant identity settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Badge issuance and verification
    Badge {
        #[command(subcommand)]
        command: BadgeCommands,
    },
    /// Raw authenticated request against the identity API
    Api(ApiArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login => commands::auth::login().await,
        Commands::Logout => commands::auth::logout().await,
        Commands::Session => commands::session::run().await,
        Commands::Tenant { command } => commands::tenant::run(command).await,
        Commands::App { command } => commands::app::run(command).await,
        Commands::Policy { command } => commands::policy::run(command).await,
        Commands::Device { command } => commands::device::run(command).await,
        Commands::Settings { command } => commands::settings::run(command).await,
        Commands::Badge { command } => commands::badge::run(command).await,
        Commands::Api(args) => {
            let code = commands::api::run(args).await;
            std::process::exit(code);
        }
    };

    if let Err(e) = result {
        exit_error(&e.to_string(), None);
    }
}
