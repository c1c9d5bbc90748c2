//! HTTP plumbing shared by both sources.
//!
//! Maps transport results onto [`PageOutcome`] so that every source applies
//! the same transient/permanent split.

use crate::source::PageOutcome;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Build the connection-reusing client for one run
pub fn build_client(
    timeout: Duration,
    user_agent: &str,
    accept_language: Option<&str>,
) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(language) = accept_language {
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(language).context("Invalid Accept-Language header")?,
        );
    }

    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(headers)
        .build()
        .context("Failed to create HTTP client")
}

/// Classify a non-success status
///
/// 429 is rate limiting, 5xx is worth retrying, anything else will not get
/// better by asking again.
pub fn classify_status(status: StatusCode, body: &str) -> PageOutcome {
    if status == StatusCode::TOO_MANY_REQUESTS {
        PageOutcome::RateLimited
    } else if status.is_server_error() {
        PageOutcome::TransientError(format!("server returned {}", status))
    } else {
        let snippet: String = body.chars().take(200).collect();
        PageOutcome::HardFailure(format!("server returned {}: {}", status, snippet))
    }
}

/// Classify a transport-level error (connect, timeout, body read)
pub fn classify_error(error: &reqwest::Error) -> PageOutcome {
    if let Some(status) = error.status() {
        return classify_status(status, "");
    }
    if error.is_builder() {
        return PageOutcome::HardFailure(format!("invalid request: {}", error));
    }
    PageOutcome::TransientError(error.to_string())
}
