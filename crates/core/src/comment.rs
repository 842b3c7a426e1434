//! Append-only comment log entries shared by goals and key results.

use chrono::{DateTime, Utc};
use okrs_shared::CommentId;
use serde::{Deserialize, Serialize};

use crate::error::{OkrError, OkrResult};

/// A single immutable comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: CommentId,
    /// Trimmed comment text.
    pub text: String,
    /// Server timestamp at which the comment was appended.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment stamped with the current time.
    ///
    /// # Errors
    /// Returns `OkrError::EmptyComment` if the text is blank after trimming.
    pub fn new(text: &str) -> OkrResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(OkrError::EmptyComment);
        }
        Ok(Self {
            id: CommentId::new(),
            text: text.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Appends a comment to a log and returns it. The latest comment is always
/// the last element.
pub(crate) fn append(log: &mut Vec<Comment>, text: &str) -> OkrResult<Comment> {
    let comment = Comment::new(text)?;
    log.push(comment.clone());
    Ok(comment)
}
