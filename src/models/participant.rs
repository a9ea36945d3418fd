//! Participant identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    utils::validation::validate_participant_id,
};

/// Opaque, pre-authenticated identifier of a player (email or user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Build an identifier from untrusted input, trimming surrounding whitespace
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        validate_participant_id(trimmed).map_err(|e| AppError::InvalidInput(e.to_string()))?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
