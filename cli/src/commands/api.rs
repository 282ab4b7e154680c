use clap::Args;
use serde_json::json;

use agentid_client::{ClientError, RequestSpec};

use crate::util::{build_runtime, exit_error, read_json_from_file};

#[derive(Args)]
pub struct ApiArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    pub method: String,

    /// API path relative to the identity API (e.g. /v1alpha1/apps)
    pub path: String,

    /// Request body as JSON string
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Read request body from file (use '-' for stdin)
    #[arg(long, short = 'f', conflicts_with = "data")]
    pub data_file: Option<String>,

    /// Query parameters (repeatable: key=value)
    #[arg(long, short = 'q')]
    pub query: Vec<String>,

    /// Extra headers (repeatable: Key:Value)
    #[arg(long, short = 'H')]
    pub header: Vec<String>,

    /// Skip authentication (for public endpoints like /health)
    #[arg(long)]
    pub no_auth: bool,
}

/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn run(args: ApiArgs) -> i32 {
    let method = match args.method.to_uppercase().parse::<reqwest::Method>() {
        Ok(m) => m,
        Err(_) => exit_error(
            &format!("Unknown HTTP method: {}", args.method),
            Some("Supported methods: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS"),
        ),
    };

    // Parse query parameters
    let mut query = Vec::new();
    for q in &args.query {
        match q.split_once('=') {
            Some((k, v)) => query.push((k.to_string(), v.to_string())),
            None => exit_error(
                &format!("Invalid query parameter: '{q}'"),
                Some("Format: key=value, e.g. --query page=2"),
            ),
        }
    }

    // Parse extra headers
    let mut headers = Vec::new();
    for h in &args.header {
        match h.split_once(':') {
            Some((k, v)) => headers.push((k.trim().to_string(), v.trim().to_string())),
            None => exit_error(
                &format!("Invalid header: '{h}'"),
                Some("Format: Key:Value, e.g. --header Accept:application/json"),
            ),
        }
    }

    // Resolve body
    let body = if let Some(ref d) = args.data {
        match serde_json::from_str(d) {
            Ok(v) => Some(v),
            Err(e) => exit_error(
                &format!("Invalid JSON in --data: {e}"),
                Some("Provide valid JSON string"),
            ),
        }
    } else if let Some(ref f) = args.data_file {
        match read_json_from_file(f) {
            Ok(v) => Some(v),
            Err(e) => exit_error(&e, Some("Provide a valid JSON file or use '-' for stdin")),
        }
    } else {
        None
    };

    let runtime = match build_runtime(args.no_auth).await {
        Ok(r) => r,
        Err(e) => exit_error(
            &e.to_string(),
            Some("Run `agentid login` or use --no-auth for public endpoints"),
        ),
    };

    let mut spec = RequestSpec::new(method, &args.path).with_query(query);
    for (name, value) in headers {
        spec = spec.with_header(name, value);
    }
    if let Some(body) = body {
        spec = spec.with_body(body);
    }

    // The raw passthrough hits the identity API host; strip the
    // facade's own /v1alpha1 prefix so the caller controls the path.
    let transport = runtime.apis.agentic_services.transport();
    let base = transport
        .base_url()
        .trim_end_matches("/v1alpha1")
        .to_string();
    let raw = agentid_client::ApiClient::new(base, agentid_client::AuthPolicy::default());
    raw.set_auth_info(transport.auth_info());

    match raw.execute(spec).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            0
        }
        Err(ClientError::Api { status, body }) => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_default()
            );
            if (400..500).contains(&status) { 1 } else { 2 }
        }
        Err(ClientError::SessionExpired) => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "error": "session_expired",
                    "message": "Session expired. Run `agentid login` again."
                }))
                .unwrap_or_default()
            );
            1
        }
        Err(err) => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "error": "connection_error",
                    "message": err.to_string(),
                    "docs_hint": "Is the identity API reachable? Check AGENTID_API_URL."
                }))
                .unwrap_or_default()
            );
            3
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_query_parsing() {
        let input = "page=2";
        let (k, v) = input.split_once('=').unwrap();
        assert_eq!(k, "page");
        assert_eq!(v, "2");
    }

    #[test]
    fn test_header_parsing() {
        let input = "Accept: application/json";
        let (k, v) = input.split_once(':').unwrap();
        assert_eq!(k.trim(), "Accept");
        assert_eq!(v.trim(), "application/json");
    }
}
