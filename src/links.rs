//! Link (URL) accessibility checking
//!
//! Best-effort, sequential reachability probes for hyperlinks embedded
//! in metadata records. A verified-TLS attempt that fails is retried
//! exactly once without certificate verification; the outcome of that
//! fallback determines reachability. This module never returns an
//! error: every failure branch degrades to a non-accessible result with
//! a diagnostic.

use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use url::Url;
use tracing::debug;

/// Default link check timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of a single link check. One per invocation; never cached.
#[derive(Debug, Clone, Serialize)]
pub struct LinkCheckResult {
    /// The URL as found in the record
    #[serde(rename = "url-original")]
    pub url_original: String,
    /// The URL after redirects, when the link resolved
    #[serde(rename = "url-resolved", skip_serializing_if = "Option::is_none")]
    pub url_resolved: Option<String>,
    /// Whether the resource was reachable
    pub accessible: bool,
    /// Content type of the resolved resource, without parameters
    #[serde(rename = "mime-type")]
    pub mime_type: Option<String>,
    /// TLS verification status, set only for attempts where it applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,
}

impl LinkCheckResult {
    fn unreachable(url: &str) -> Self {
        Self {
            url_original: url.to_string(),
            url_resolved: None,
            accessible: false,
            mime_type: None,
            ssl: None,
        }
    }
}

/// The two attempt modes of a link check, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Verified,
    Unverified,
}

/// Sequential link checker with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct LinkChecker {
    timeout: Duration,
}

impl Default for LinkChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkChecker {
    /// Create a checker with the default 30 second timeout
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check a URL for accessibility.
    ///
    /// With `verify_tls`, the first attempt uses full certificate
    /// verification; on any failure the same URL is retried once in an
    /// unverified context, and that attempt decides reachability. With
    /// `verify_tls` false, only the unverified attempt is made. The
    /// fallback keeps the caller's timeout.
    pub fn check(&self, url: &str, verify_tls: bool) -> LinkCheckResult {
        let mut result = LinkCheckResult::unreachable(url);

        if Url::parse(url).is_err() {
            debug!("not a parseable URL: {}", url);
            return result;
        }

        let mut attempt = if verify_tls {
            Attempt::Verified
        } else {
            Attempt::Unverified
        };

        // Two-state retry: a failed verified attempt transitions to one
        // unverified attempt, nothing more.
        loop {
            if attempt == Attempt::Unverified {
                debug!("creating unverified context");
                result.ssl = Some(false);
            }

            match self.open(url, attempt) {
                Ok(response) => {
                    record_response(&mut result, &response, attempt);
                    return result;
                }
                Err(err) => {
                    debug!("request error for {}: {}", url, err);
                    match attempt {
                        Attempt::Verified => attempt = Attempt::Unverified,
                        Attempt::Unverified => return result,
                    }
                }
            }
        }
    }

    fn open(&self, url: &str, attempt: Attempt) -> reqwest::Result<Response> {
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(attempt == Attempt::Unverified)
            .build()?;
        client.get(url).send()
    }

}

fn record_response(result: &mut LinkCheckResult, response: &Response, attempt: Attempt) {
    let resolved: &Url = response.url();
    result.url_resolved = Some(resolved.to_string());

    match resolved.scheme() {
        "http" | "https" => {
            let status = response.status();
            if !status.is_success() && !status.is_redirection() {
                debug!("request failed: {} for {}", status, resolved);
            }
            result.accessible = status.as_u16() < 300;
            result.mime_type = content_type(response);
        }
        // For non-HTTP schemes the successful open is reachability
        _ => result.accessible = true,
    }

    if resolved.scheme() == "https" && attempt == Attempt::Verified {
        result.ssl = Some(true);
    }
}

/// Content type of a response, with any parameters stripped
fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or(value)
                .trim()
                .to_string()
        })
}
