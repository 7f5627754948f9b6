//! Outbound HTTP clients.
//!
//! - [`ArxivClient`]: Atom query API plus the source, HTML and e-print documents
//! - [`CompletionClient`]: OpenAI-compatible chat completions behind [`CompletionService`]
//!
//! Every call is attempted exactly once with a per-request timeout; callers decide
//! what a failure degrades to.

mod arxiv;
mod completion;

pub use arxiv::ArxivClient;
pub use completion::{CompletionClient, CompletionService};

use std::time::Duration;

use reqwest::Client;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// Build the pooled reqwest client shared by one upstream.
fn build_http(config: &Config, timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(api::USER_AGENT)
        .timeout(timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Turn a non-success status into a [`ClientError::Status`].
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), truncate(&text, 200)))
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
