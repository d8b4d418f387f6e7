//! Common types and utilities shared across Talkback crates.
//!
//! This crate defines the comment/report domain model, observability helpers and the
//! shared error type used throughout the Talkback workspace. It is intentionally
//! lightweight so that every crate can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`Comment`] and [`CommentList`]: cleaned comment text in site order
//! - [`Report`]: the externally visible result of one pipeline run
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`TalkbackError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use talkback_common::{Comment, Report};
//!
//! let comment = Comment::from_raw("\tGreat\narticle\t");
//! assert_eq!(comment.as_str(), "Greatarticle");
//!
//! let report = Report::assemble(12, "<p>Mostly positive.</p>".to_string());
//! assert_eq!(report.num_comments, 12);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Notice returned in place of a summary when the completion service throttles us.
pub const RATE_LIMIT_NOTICE: &str =
    "You have hit the OpenAI API rate limit. Please try again later.";

/// A single user comment with page layout whitespace removed.
///
/// Never contains tab or newline characters; the only way to build one from
/// markup text is [`Comment::from_raw`], which strips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(String);

impl Comment {
    /// Build a comment from raw node text, dropping `\t`, `\n` and `\r`.
    pub fn from_raw(raw: &str) -> Self {
        let mut text = raw.to_string();
        text.retain(|ch| !matches!(ch, '\t' | '\n' | '\r'));
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Comment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Comments in the chronological order the site presents them.
pub type CommentList = Vec<Comment>;

/// Outcome of one aggregation run.
///
/// Serialises with the field names the presentation layer expects
/// (`numComments`, `summary`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Size of the comment list *before* sampling.
    pub num_comments: usize,
    pub summary: String,
}

impl Report {
    /// Combine the pre-sampling comment count with the produced summary.
    pub fn assemble(original_count: usize, summary: String) -> Self {
        Self {
            num_comments: original_count,
            summary,
        }
    }

    /// Substitute report handed back when the completion service answers 429.
    pub fn rate_limited() -> Self {
        Self {
            num_comments: 0,
            summary: RATE_LIMIT_NOTICE.to_string(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.num_comments == 0 && self.summary == RATE_LIMIT_NOTICE
    }
}

/// Error types used across the Talkback system.
#[derive(thiserror::Error, Debug)]
pub enum TalkbackError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging or another process-level facility could not start.
    #[error("Setup error: {0}")]
    Setup(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`TalkbackError`].
pub type Result<T> = std::result::Result<T, TalkbackError>;
