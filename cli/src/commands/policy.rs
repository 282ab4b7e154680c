use clap::Subcommand;

use agentid_core::page::PageQuery;
use agentid_core::policy::{CreatePolicyRequest, RuleAction, RuleBody, UpdatePolicyRequest};

use crate::util::{build_runtime, print_json};

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// List access policies
    List {
        #[arg(long)]
        page: Option<i32>,
        #[arg(long)]
        size: Option<i32>,
    },
    /// Show one policy with its rules
    Show { policy_id: String },
    /// Create a policy assigned to a requester service
    Create {
        #[arg(long)]
        name: String,
        /// App ID of the requester service this policy applies to
        #[arg(long)]
        assigned_to: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a policy
    Update {
        policy_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a policy
    Delete { policy_id: String },
    /// Total policy count
    Count,
    /// Rule operations within a policy
    Rule {
        #[command(subcommand)]
        command: RuleCommands,
    },
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List rules of a policy
    List { policy_id: String },
    /// Create a rule
    Create {
        policy_id: String,
        #[arg(long)]
        name: String,
        /// allow or deny
        #[arg(long, value_parser = parse_action)]
        action: RuleAction,
        /// Task IDs this rule covers (repeatable)
        #[arg(long)]
        task: Vec<String>,
        /// Require user approval on invocation
        #[arg(long)]
        needs_approval: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a rule
    Delete { policy_id: String, rule_id: String },
}

fn parse_action(value: &str) -> Result<RuleAction, String> {
    match value.to_ascii_lowercase().as_str() {
        "allow" => Ok(RuleAction::Allow),
        "deny" => Ok(RuleAction::Deny),
        other => Err(format!("unknown action '{other}' (expected allow or deny)")),
    }
}

pub async fn run(command: PolicyCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let policies = &runtime.apis.policies;

    match command {
        PolicyCommands::List { page, size } => {
            let page = PageQuery {
                page,
                size,
                query: None,
            };
            print_json(&policies.list_policies(&page).await?)
        }
        PolicyCommands::Show { policy_id } => print_json(&policies.get_policy(&policy_id).await?),
        PolicyCommands::Create {
            name,
            assigned_to,
            description,
        } => {
            let request = CreatePolicyRequest {
                name,
                description,
                assigned_to,
            };
            print_json(&policies.create_policy(&request).await?)
        }
        PolicyCommands::Update {
            policy_id,
            name,
            assigned_to,
            description,
        } => {
            let request = UpdatePolicyRequest {
                name,
                description,
                assigned_to,
            };
            print_json(&policies.update_policy(&policy_id, &request).await?)
        }
        PolicyCommands::Delete { policy_id } => {
            policies.delete_policy(&policy_id).await?;
            print_json(&serde_json::json!({"status": "deleted", "policy_id": policy_id}))
        }
        PolicyCommands::Count => print_json(&policies.get_policies_count().await?),
        PolicyCommands::Rule { command } => match command {
            RuleCommands::List { policy_id } => {
                print_json(&policies.list_rules(&policy_id, &PageQuery::default()).await?)
            }
            RuleCommands::Create {
                policy_id,
                name,
                action,
                task,
                needs_approval,
                description,
            } => {
                let request = RuleBody {
                    name,
                    description,
                    tasks: task,
                    needs_approval,
                    action,
                };
                print_json(&policies.create_rule(&policy_id, &request).await?)
            }
            RuleCommands::Delete { policy_id, rule_id } => {
                policies.delete_rule(&policy_id, &rule_id).await?;
                print_json(&serde_json::json!({"status": "deleted", "rule_id": rule_id}))
            }
        },
    }
}
