//! Pulls the completion out of a generation envelope.

use tracing::{debug, warn};

use crate::contract::{Completion, ModelResponse, Task};

/// Return the trimmed completion, or the task's sentinel when the field is absent.
///
/// A present but empty completion is returned as empty text, not as the sentinel.
pub fn extract_completion(response: &ModelResponse, task: Task) -> Completion {
    match response.response.as_deref() {
        Some(text) => {
            debug!(
                chars = text.len(),
                model = response.model.as_deref().unwrap_or("unknown"),
                eval_count = response.eval_count,
                "Extracted completion from response"
            );
            Completion::Text(text.trim().to_string())
        }
        None => {
            warn!(task = %task, "Response envelope has no completion field");
            Completion::Missing(task.sentinel())
        }
    }
}
