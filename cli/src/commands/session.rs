use serde_json::json;

use crate::util::{build_runtime, print_json};

/// Show the local session projection, plus the IAM backend's view of
/// it when the multi-tenant flow is active.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(false).await?;
    let bundle = runtime
        .auth
        .current()
        .ok_or("No active session. Run `agentid login`.")?;

    let mut output = json!({
        "user": bundle.user,
        "expires_at": bundle.access_token.expires_at,
        "has_refresh_token": bundle.refresh_token.is_some(),
    });

    if let Some(iam) = &runtime.apis.iam {
        output["iam_session"] = serde_json::to_value(iam.get_session().await?)?;
    }

    print_json(&output)
}
