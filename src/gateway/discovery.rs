//! Backend endpoint discovery.
//!
//! The backend walks a small port range at startup when its preferred port
//! is taken, so a configured base URL can go stale while the server is
//! alive one port over. [`EndpointResolver`] probes the candidate URLs and
//! returns the first one that answers, leaving it to the caller to cache
//! the result and retry.
//!
//! A candidate "answers" when `GET {candidate}/health` comes back with any
//! HTTP status other than 404; a 404 on the health path means some other
//! server is squatting on the port. Connection failures and probe timeouts
//! reject the candidate.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;

/// Candidate base URLs for discovery, in probe order.
///
/// The configured base URL comes first, then the configured fallback ports
/// applied to the same scheme and host, deduplicated.
pub fn candidate_urls(config: &ClientConfig) -> Vec<String> {
    let base = config.base_url().to_string();
    let mut candidates = vec![base.clone()];

    if let Ok(mut url) = url::Url::parse(&base) {
        for &port in &config.discovery.candidate_ports {
            if url.set_port(Some(port)).is_ok() {
                candidates.push(url.as_str().trim_end_matches('/').to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

/// Probes candidate endpoints and reports the first live one.
///
/// Read-only: it never rewrites the gateway's base URL itself. The gateway
/// composes the resolved value with its one-shot retry and caches it in
/// the context.
pub struct EndpointResolver {
    config: ClientConfig,
    client: reqwest::Client,
}

impl EndpointResolver {
    /// Create a resolver with its own short-deadline probe client.
    pub fn new(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.discovery.probe_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Returns the resolver's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Probe the candidates in order, returning the first live base URL.
    ///
    /// `None` when nothing answers.
    pub async fn resolve(&self) -> Option<String> {
        for candidate in candidate_urls(&self.config) {
            if self.probe(&candidate).await {
                info!(endpoint = %candidate, "resolved backend endpoint");
                return Some(candidate);
            }
        }
        warn!("no backend endpoint answered on any candidate");
        None
    }

    /// Whether one candidate is answering on its health path.
    async fn probe(&self, base_url: &str) -> bool {
        let url = format!("{}/health", base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    debug!(candidate = %base_url, "health path answered 404; not our backend");
                    false
                } else {
                    debug!(
                        candidate = %base_url,
                        status = status.as_u16(),
                        "candidate is answering"
                    );
                    true
                }
            }
            Err(e) => {
                debug!(candidate = %base_url, error = %e, "candidate not answering");
                false
            }
        }
    }
}
