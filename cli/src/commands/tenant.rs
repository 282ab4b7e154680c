use clap::Subcommand;

use crate::util::{StoredCredentials, build_runtime, print_json, save_credentials};

#[derive(Subcommand)]
pub enum TenantCommands {
    /// List tenants visible to the signed-in user
    List,
    /// Show one tenant
    Show {
        tenant_id: String,
    },
    /// Create a tenant owned by the signed-in user
    Create,
    /// Rename a tenant
    Rename {
        tenant_id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a tenant
    Delete {
        tenant_id: String,
    },
    /// Re-authenticate against another tenant
    Switch {
        tenant_id: String,
    },
}

pub async fn run(command: TenantCommands) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let Some(iam) = &runtime.apis.iam else {
        return Err(
            "Tenant operations need the multi-tenant IAM flow (AGENTID_AUTH_TYPE=iam).".into(),
        );
    };

    match command {
        TenantCommands::List => print_json(&iam.get_tenants().await?),
        TenantCommands::Show { tenant_id } => print_json(&iam.get_tenant(&tenant_id).await?),
        TenantCommands::Create => print_json(&iam.create_tenant().await?),
        TenantCommands::Rename { tenant_id, name } => {
            print_json(&iam.update_tenant(&tenant_id, name).await?)
        }
        TenantCommands::Delete { tenant_id } => print_json(&iam.delete_tenant(&tenant_id).await?),
        TenantCommands::Switch { tenant_id } => {
            let current = runtime
                .auth
                .current()
                .ok_or("No active session. Run `agentid login`.")?;
            let refresh_token = current
                .refresh_token
                .as_ref()
                .ok_or("The current session has no refresh token; tenant switch needs one.")?;
            let bundle = runtime
                .auth
                .flow()
                .switch_tenant(&refresh_token.token, &tenant_id)
                .await?;

            // The switched bundle becomes the session for every client
            // and for later CLI invocations.
            runtime.auth.install(bundle.clone());
            runtime.apis.set_auth_info(Some(bundle.clone()));
            save_credentials(&StoredCredentials::from_bundle(
                runtime.auth.flow().issuer(),
                &bundle,
            ))?;
            print_json(&bundle.user)
        }
    }
}
