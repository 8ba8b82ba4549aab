//! Request runner
//!
//! One run is a linear sequence: build the request from configuration,
//! construct a client, call the endpoint once, and print the response.
//! Nothing is shared between runs.

use crate::client::{CompletionResponse, InferenceClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::output;
use std::io::Write;

/// Execute one request and write the response to `out`
///
/// Output is only written after a successful call, so a failed run never
/// produces partial or success-looking output.
pub async fn run<W: Write>(config: &Config, out: &mut W) -> AppResult<CompletionResponse> {
    let request = config.build_request()?;
    let client = InferenceClient::new(config.endpoint.clone())?;

    let response = client.complete(&request).await?;

    tracing::info!(
        request_id = %response.request_id(),
        format = ?config.output,
        "Chat completion succeeded"
    );

    output::render(out, &response, config.output)?;
    Ok(response)
}
