//! The request gateway.
//!
//! [`RequestGateway`] is the single HTTP surface of the client. Every call
//! runs the same pipeline:
//!
//! 1. read the current token from the session (freshly, never cached
//!    across requests) and attach it as a bearer credential;
//! 2. dispatch with a finite deadline;
//! 3. translate the outcome: 401 clears the session and redirects to login
//!    exactly once per authenticated session; an unreachable backend
//!    triggers endpoint discovery and a single retry; a timeout surfaces
//!    as its own error; everything else becomes a typed [`ApiError`] with
//!    a human-readable message.
//!
//! Raw transport errors never cross this boundary.

pub mod discovery;

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::error::{ApiError, Result};
use crate::session::SessionManager;
use discovery::EndpointResolver;

pub use discovery::candidate_urls;

/// The authenticated HTTP pipeline fronting the Tasklight API.
///
/// Construct one per logical client with an explicit [`ClientContext`];
/// clones of the context observe the same session.
pub struct RequestGateway {
    config: ClientConfig,
    context: ClientContext,
    session: SessionManager,
    resolver: EndpointResolver,
    client: reqwest::Client,
}

impl RequestGateway {
    /// Create a gateway over the given configuration and context.
    pub fn new(config: ClientConfig, context: ClientContext) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .unwrap_or_default();
        let resolver = EndpointResolver::new(config.clone());
        let session = SessionManager::new(context.clone());
        Self {
            config,
            context,
            session,
            resolver,
            client,
        }
    }

    /// The gateway configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared context.
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// The session manager bound to this gateway's context.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None::<&()>).await
    }

    /// POST a JSON body, decoding a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body)).await
    }

    /// PUT a JSON body, decoding a JSON response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::PUT, path, Some(body)).await
    }

    /// PATCH a JSON body, decoding a JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::PATCH, path, Some(body)).await
    }

    /// DELETE a resource, expecting an empty success response.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn request_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(method, path, body).await?;
        let status = resp.status();
        resp.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout()
            } else {
                warn!(error = %e, status = status.as_u16(), "response body decode failed");
                ApiError::from_status(status.as_u16(), None)
            }
        })
    }

    /// Run one request through the full interceptor pipeline.
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let base = self.effective_base_url();
        match self.dispatch(&base, method.clone(), path, body).await {
            Ok(resp) => self.check_status(resp).await,
            Err(e) => {
                let error = classify_send_error(&e);
                let reachable_elsewhere = matches!(error, ApiError::NetworkUnreachable(_))
                    && self.config.discovery.enabled;
                if !reachable_elsewhere {
                    warn!(url = %base, error = %e, "request failed without a response");
                    return Err(error);
                }

                warn!(url = %base, error = %e, "backend unreachable; probing for a live endpoint");
                let Some(endpoint) = self.resolver.resolve().await else {
                    return Err(error);
                };
                self.context.set_resolved_endpoint(&endpoint);

                match self.dispatch(&endpoint, method, path, body).await {
                    Ok(resp) => self.check_status(resp).await,
                    Err(retry_err) => {
                        warn!(
                            url = %endpoint,
                            error = %retry_err,
                            "retry against resolved endpoint failed"
                        );
                        Err(classify_send_error(&retry_err))
                    }
                }
            }
        }
    }

    /// Build and send one HTTP request, reading the token freshly.
    async fn dispatch<B>(
        &self,
        base_url: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> reqwest::Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        debug!(method = %method, url = %url, "dispatching request");

        let mut request = self.client.request(method, &url);
        if let Some(token) = self.session.token().await {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    /// Translate a non-success response into an [`ApiError`].
    async fn check_status(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = extract_body_message(&body);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.force_logout().await;
        }

        warn!(status = status.as_u16(), "request rejected by the backend");
        Err(ApiError::from_status(status.as_u16(), message))
    }

    /// Clear the session after a server-asserted 401.
    ///
    /// However many in-flight requests observe the 401, only the latch
    /// winner clears storage and navigates; the rest just fail with their
    /// own `Unauthorized` error.
    async fn force_logout(&self) {
        if self.context.claim_redirect() {
            info!("session rejected with 401; clearing it and redirecting to login");
            self.session.remove_token().await;
            self.session.remove_user_id().await;
            self.context.navigator().redirect_to_login();
        } else {
            debug!("session already cleared for this 401 burst");
        }
    }

    fn effective_base_url(&self) -> String {
        self.context
            .resolved_endpoint()
            .unwrap_or_else(|| self.config.base_url().to_string())
    }
}

/// Classify a send-phase transport error.
///
/// Timeouts are their own taxonomy entry; every other no-response failure
/// counts as an unreachable backend (discovery's trigger).
fn classify_send_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::timeout()
    } else {
        ApiError::network_unreachable()
    }
}

/// Pull the structured `message` field out of an error body, if present.
///
/// Blank messages are treated as absent so the static status map takes
/// over.
fn extract_body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.chars().take(500).collect())
    }
}
