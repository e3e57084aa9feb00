use std::time::Duration;

use reqwest::{header::HeaderMap, Client, Response};

/// Every provider client has a bounded timeout, so a stalled provider never holds a request forever.
pub(crate) fn build_client(headers: HeaderMap, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().default_headers(headers).timeout(timeout).build()
}

/// Splits a failed response into its status code and body text.
pub(crate) async fn error_details(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_else(|e| format!("Could not read the response body. {e}"));
    (status, message)
}
