//! Wire types shared by the resource clients.
//!
//! Shapes mirror the Tasklight REST API. Timestamps arrive as naive ISO-8601
//! strings in UTC (the backend serialises `utcnow()` without an offset), so
//! they are modelled as [`NaiveDateTime`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length accepted by the backend.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length accepted by the backend.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A task record, owned by the backend.
///
/// The client holds these only as a transient per-page mirror; there is no
/// local persistence of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Title (required, at most [`MAX_TITLE_LEN`] characters).
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Creation time (UTC, naive).
    pub created_at: NaiveDateTime,
    /// Last-update time (UTC, naive).
    pub updated_at: NaiveDateTime,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Title (must be non-empty after trimming; enforced client-side).
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTask {
    /// Create a new-task payload with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update payload for a task. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// An empty patch (no fields set).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the completion flag.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// The authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
}

/// Response of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token scheme hint (the backend sends `"bearer"`).
    #[serde(default)]
    pub token_type: String,
    /// The authenticated user.
    pub user: User,
}

/// Request body for the chat collaborator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The natural-language message.
    pub message: String,
    /// Continue an existing conversation, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Start or continue a conversation with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    /// Continue the given conversation.
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }
}

/// A tool invocation reported by the chat service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name.
    pub tool: String,
    /// Tool arguments as sent by the service.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Response of `POST /api/{userId}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Conversation identifier (create or echo).
    pub conversation_id: String,
    /// Assistant reply text.
    pub response: String,
    /// Tools the service executed while answering.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// ISO 8601 timestamp string, as sent by the service.
    pub timestamp: String,
}
