//! Battle room model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::{Challenge, ParticipantId};

/// Battle room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Kept for wire compatibility; matchmaking creates rooms directly as active
    Waiting,
    Active,
    Completed,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a room reached `completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// A participant passed every test case
    Solved,
    /// Nobody solved the challenge before the deadline
    TimedOut,
}

/// Live session pairing two participants with one challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRoom {
    pub id: String,
    /// Pairing order: earliest arrival first
    pub participants: [ParticipantId; 2],
    pub challenge: Challenge,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deadline: DateTime<Utc>,
    pub winner: Option<ParticipantId>,
    pub completion_reason: Option<CompletionReason>,
}

impl BattleRoom {
    /// Create a room that starts immediately
    pub fn start(
        id: String,
        participants: [ParticipantId; 2],
        challenge: Challenge,
        now: DateTime<Utc>,
    ) -> Self {
        let deadline = now + Duration::seconds(challenge.time_limit_secs as i64);

        Self {
            id,
            participants,
            challenge,
            status: RoomStatus::Active,
            created_at: now,
            started_at: now,
            completed_at: None,
            deadline,
            winner: None,
            completion_reason: None,
        }
    }

    pub fn has_participant(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// The other participant, or `None` when `participant` is not in this room
    pub fn opponent_of(&self, participant: &ParticipantId) -> Option<&ParticipantId> {
        match &self.participants {
            [a, b] if a == participant => Some(b),
            [a, b] if b == participant => Some(a),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RoomStatus::Completed
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.deadline <= now
    }

    /// Transition to `completed`; completed rooms never change again
    pub fn complete(
        &mut self,
        winner: Option<ParticipantId>,
        reason: CompletionReason,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.is_completed() {
            return Err(AppError::AlreadyCompleted);
        }

        if let Some(winner) = &winner {
            if !self.has_participant(winner) {
                return Err(AppError::Forbidden(
                    "Winner is not a participant of this battle".to_string(),
                ));
            }
        }

        self.status = RoomStatus::Completed;
        self.completed_at = Some(at);
        self.winner = winner;
        self.completion_reason = Some(reason);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{participant, sample_challenge};

    fn room() -> BattleRoom {
        BattleRoom::start(
            "battle_1_abc".to_string(),
            [participant("alice"), participant("bob")],
            sample_challenge(),
            Utc::now(),
        )
    }

    #[test]
    fn test_opponent_lookup() {
        let room = room();
        assert_eq!(room.opponent_of(&participant("alice")), Some(&participant("bob")));
        assert_eq!(room.opponent_of(&participant("bob")), Some(&participant("alice")));
        assert_eq!(room.opponent_of(&participant("carol")), None);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut room = room();
        let now = Utc::now();

        room.complete(Some(participant("alice")), CompletionReason::Solved, now)
            .unwrap();
        assert_eq!(room.status, RoomStatus::Completed);
        assert_eq!(room.completed_at, Some(now));

        let err = room
            .complete(Some(participant("bob")), CompletionReason::Solved, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompleted));
        assert_eq!(room.winner, Some(participant("alice")));
    }

    #[test]
    fn test_outsider_cannot_win() {
        let mut room = room();
        let err = room
            .complete(Some(participant("mallory")), CompletionReason::Solved, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(room.status, RoomStatus::Active);
    }

    #[test]
    fn test_deadline_follows_challenge_budget() {
        let room = room();
        assert_eq!(
            room.deadline - room.started_at,
            Duration::seconds(room.challenge.time_limit_secs as i64)
        );
        assert!(!room.is_overdue(room.started_at));
        assert!(room.is_overdue(room.deadline));
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(room()).unwrap();
        assert_eq!(value["status"], "active");
        assert_eq!(value["participants"][0], "alice");
        assert!(value["winner"].is_null());
        assert!(value.get("startedAt").is_some());
    }
}
