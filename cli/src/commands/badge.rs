use clap::Subcommand;

use agentid_core::badge::{
    IssueA2aBadgeRequest, IssueMcpBadgeRequest, VerifyBadgeRequest,
};

use crate::util::{build_runtime, print_json, read_json_from_file};

#[derive(Subcommand)]
pub enum BadgeCommands {
    /// Issue a badge for an A2A agent via its well-known URL
    IssueA2a {
        app_id: String,
        #[arg(long)]
        well_known_url: String,
    },
    /// Issue a badge for an MCP server
    IssueMcp {
        app_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
    },
    /// Verify a badge from a JSON file
    Verify {
        /// Badge JSON (use '-' for stdin)
        #[arg(long)]
        file: String,
    },
}

pub async fn run(command: BadgeCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let badges = &runtime.apis.badges;

    match command {
        BadgeCommands::IssueA2a {
            app_id,
            well_known_url,
        } => {
            let request = IssueA2aBadgeRequest { well_known_url };
            print_json(&badges.issue_a2a_badge(&app_id, &request).await?)
        }
        BadgeCommands::IssueMcp { app_id, name, url } => {
            let request = IssueMcpBadgeRequest { name, url };
            print_json(&badges.issue_mcp_badge(&app_id, &request).await?)
        }
        BadgeCommands::Verify { file } => {
            let value = read_json_from_file(&file)?;
            let badge = serde_json::from_value(value)?;
            print_json(&badges.verify_badge(&VerifyBadgeRequest { badge }).await?)
        }
    }
}
