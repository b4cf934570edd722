//! Error types for skill-invidious
//!
//! Only skill construction can fail. Searches degrade to empty results and
//! never return these errors.

use crate::services::InvidiousError;
use thiserror::Error;

/// Skill error type
#[derive(Debug, Error)]
pub enum SkillError {
    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(#[from] InvidiousError),

    /// Invalid request (unknown profile, bad argument)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// skill-common error (settings loading)
    #[error("Common error: {0}")]
    Common(#[from] skill_common::Error),
}

/// Result type for skill operations
pub type SkillResult<T> = Result<T, SkillError>;
