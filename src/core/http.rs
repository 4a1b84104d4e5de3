use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// 所有外部 API 共用的 HTTP client
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("zonescout/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Reads the body of a failed response for error reporting.
pub async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) if !body.is_empty() => body,
        Ok(_) => "<empty body>".to_string(),
        Err(e) => format!("<unreadable body: {}>", e),
    }
}
