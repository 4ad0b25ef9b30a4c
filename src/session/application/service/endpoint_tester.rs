//! Simulated connectivity check. Never touches the network.

use crate::{
    core::domain::{
        model::endpoint_config::EndpointConfig,
        value_object::{ApiToken, EndpointUrl, validate_api_token, validate_endpoint_url},
    },
    session::application::response::connection_test_result::ConnectionTestResult,
};
use std::time::Duration;

const URL_HINT: &str = "Invalid API URL format (expected https://...:8006).";
const TOKEN_HINT: &str = "Invalid API Token format (expected user@realm!tokenid=secret_value).";

/// Checks the URL and token shapes of `endpoint`.
///
/// Passes when the URL is `https://` on port 8006 and the token looks like
/// `user@realm!tokenid=secret`.
pub fn check_endpoint(endpoint: &EndpointConfig) -> ConnectionTestResult {
    let url = endpoint.api_url.trim();
    let url_ok = validate_endpoint_url(url).is_ok()
        && EndpointUrl::new_unchecked(url.to_string()).is_proxmox_api();

    let token = endpoint.api_token.trim();
    let token_ok = validate_api_token(token).is_ok();

    if url_ok && token_ok {
        let token = ApiToken::new_unchecked(token.to_string());
        tracing::info!(
            endpoint_id = %endpoint.id,
            token_id = token.token_id().unwrap_or_default(),
            "Endpoint test passed"
        );
        return ConnectionTestResult::ok();
    }

    let mut message = String::from("Connection failed (mock):");
    if !url_ok {
        message.push(' ');
        message.push_str(URL_HINT);
    }
    if !token_ok {
        message.push(' ');
        message.push_str(TOKEN_HINT);
    }
    tracing::info!(endpoint_id = %endpoint.id, url_ok, token_ok, "Endpoint test failed");
    ConnectionTestResult::failed(message)
}

/// [`check_endpoint`] after `delay`, standing in for a network round-trip.
pub async fn test_endpoint(endpoint: &EndpointConfig, delay: Duration) -> ConnectionTestResult {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    check_endpoint(endpoint)
}
