use serde_json::json;

use agentid_client::provider::AuthFlow;
use agentid_core::config::AuthConfig;
use agentid_core::pkce;

use crate::util::{
    StoredCredentials, config_path, delete_credentials, load_credentials, save_credentials,
};

pub async fn login() -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthConfig::from_env()?;
    let issuer = config.issuer().to_string();
    let flow = AuthFlow::from_config(config);

    let code_verifier = pkce::generate_code_verifier();
    let code_challenge = pkce::generate_code_challenge(&code_verifier);
    let state = pkce::generate_state();

    // Start local callback server on random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://127.0.0.1:{port}/callback");

    let authorize_url = flow.authorize_url(&redirect_uri, &state, &code_challenge)?;

    eprintln!("Opening browser for authentication...");
    eprintln!("If the browser doesn't open, visit: {authorize_url}");

    let _ = open::that(&authorize_url);

    // Wait for callback (5 min timeout)
    let callback_result = tokio::select! {
        result = wait_for_callback(listener) => result,
        _ = tokio::time::sleep(std::time::Duration::from_secs(300)) => {
            return Err("Login timed out after 5 minutes.".into());
        }
    };

    let (received_code, received_state) = callback_result?;

    // Verify state
    if received_state.as_deref() != Some(state.as_str()) {
        return Err("OAuth state mismatch — possible CSRF attack.".into());
    }

    let bundle = flow
        .exchange_code(&received_code, &code_verifier, &redirect_uri)
        .await?;

    let creds = StoredCredentials::from_bundle(&issuer, &bundle);
    save_credentials(&creds)?;

    let output = json!({
        "status": "authenticated",
        "user": bundle.user,
        "expires_at": creds.expires_at,
        "config_path": config_path().to_string_lossy()
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn wait_for_callback(
    listener: tokio::net::TcpListener,
) -> Result<(String, Option<String>), Box<dyn std::error::Error>> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (mut stream, _) = listener.accept().await?;
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    // Parse GET /callback?code=...&state=... HTTP/1.1
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("");

    let url = url::Url::parse(&format!("http://localhost{path}"))
        .map_err(|e| format!("Failed to parse callback URL: {e}"))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v): (_, _)| v.to_string())
        .ok_or("No 'code' parameter in callback")?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v): (_, _)| v.to_string());

    // Send success response to browser
    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authenticated!</h1><p>You can close this tab.</p></body></html>";
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;

    Ok((code, state))
}

pub async fn logout() -> Result<(), Box<dyn std::error::Error>> {
    // Best-effort revocation before the local tokens go away.
    if let Some(creds) = load_credentials() {
        if let Ok(config) = AuthConfig::from_env() {
            let flow = AuthFlow::from_config(config);
            if let Err(err) = flow.revoke(&creds.access_token).await {
                tracing::debug!(error = %err, "access token revocation failed");
            }
            if let Some(refresh_token) = &creds.refresh_token {
                if let Err(err) = flow.revoke(refresh_token).await {
                    tracing::debug!(error = %err, "refresh token revocation failed");
                }
            }
        }
    }

    delete_credentials()?;
    let output = json!({
        "status": "logged_out",
        "config_path": config_path().to_string_lossy()
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
