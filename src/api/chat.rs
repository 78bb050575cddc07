//! Assistant chat endpoint.
//!
//! One call, owner-scoped like the task routes. The assistant may mutate
//! tasks server-side; `tool_calls` in the response says what it did so
//! the caller can refresh its view.

use crate::error::Result;
use crate::gateway::RequestGateway;
use crate::types::{ChatRequest, ChatResponse};

/// Client for `/api/{user_id}/chat`.
pub struct ChatApi<'g> {
    gateway: &'g RequestGateway,
}

impl<'g> ChatApi<'g> {
    pub fn new(gateway: &'g RequestGateway) -> Self {
        Self { gateway }
    }

    /// Send one message, optionally continuing a conversation.
    pub async fn send(&self, user_id: &str, request: &ChatRequest) -> Result<ChatResponse> {
        self.gateway
            .post_json(&format!("/api/{user_id}/chat"), request)
            .await
    }
}
