//! Task endpoints, owner-scoped under `/api/{user_id}/tasks`.
//!
//! The one invariant enforced client-side is the non-empty title: the
//! backend would reject it anyway, but catching it before the wire gives
//! the user the exact message without a round trip. Length limits (title
//! 255, description 1000) stay server-side.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::gateway::RequestGateway;
use crate::types::{NewTask, Task, TaskPatch};

#[derive(Serialize)]
struct CompletionPatch {
    completed: bool,
}

/// Client for the tasks resource.
pub struct TasksApi<'g> {
    gateway: &'g RequestGateway,
}

impl<'g> TasksApi<'g> {
    pub fn new(gateway: &'g RequestGateway) -> Self {
        Self { gateway }
    }

    /// All tasks owned by `user_id`.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Task>> {
        self.gateway.get_json(&format!("/api/{user_id}/tasks")).await
    }

    /// Create a task. Fails locally when the trimmed title is empty.
    pub async fn create(&self, user_id: &str, task: &NewTask) -> Result<Task> {
        validate_title(&task.title)?;
        self.gateway
            .post_json(&format!("/api/{user_id}/tasks"), task)
            .await
    }

    /// Fetch one task.
    pub async fn get(&self, user_id: &str, task_id: Uuid) -> Result<Task> {
        self.gateway
            .get_json(&format!("/api/{user_id}/tasks/{task_id}"))
            .await
    }

    /// Apply a partial update. A supplied title obeys the same
    /// non-empty rule as creation; omitted fields stay untouched.
    pub async fn update(&self, user_id: &str, task_id: Uuid, patch: &TaskPatch) -> Result<Task> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        self.gateway
            .put_json(&format!("/api/{user_id}/tasks/{task_id}"), patch)
            .await
    }

    /// Delete a task. The backend answers 204 with no body.
    pub async fn delete(&self, user_id: &str, task_id: Uuid) -> Result<()> {
        self.gateway
            .delete(&format!("/api/{user_id}/tasks/{task_id}"))
            .await
    }

    /// Flip the completion flag.
    pub async fn set_completed(
        &self,
        user_id: &str,
        task_id: Uuid,
        completed: bool,
    ) -> Result<Task> {
        self.gateway
            .patch_json(
                &format!("/api/{user_id}/tasks/{task_id}/complete"),
                &CompletionPatch { completed },
            )
            .await
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ApiError::Client {
            status: 422,
            message: "Task title cannot be empty.".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_codes;

    #[test]
    fn empty_title_is_rejected_locally() {
        let err = validate_title("").unwrap_err();
        assert_eq!(err.code(), error_codes::CLIENT_ERROR);
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "Task title cannot be empty.");
    }

    #[test]
    fn whitespace_title_is_rejected_locally() {
        assert!(validate_title("   \t ").is_err());
    }

    #[test]
    fn non_blank_title_passes() {
        assert!(validate_title("buy milk").is_ok());
        assert!(validate_title("  padded  ").is_ok());
    }

    #[test]
    fn completion_patch_shape() {
        let body = serde_json::to_value(CompletionPatch { completed: true }).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }
}
