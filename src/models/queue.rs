//! Matchmaking queue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParticipantId;

/// A participant waiting to be paired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedParticipant {
    pub participant: ParticipantId,
    pub joined_at: DateTime<Utc>,
}

/// Result of an atomic enqueue-and-maybe-pair step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The identifier was already waiting; nothing changed
    AlreadyQueued,
    /// The identifier already belongs to a battle, possibly one still being created
    Matched { battle_id: String },
    /// Appended without pairing; 1-based position from the head
    Queued { position: usize },
    /// The two oldest entries were removed, earliest arrival first, and
    /// reserved under the battle id passed to the join
    Paired {
        first: ParticipantId,
        second: ParticipantId,
    },
}
