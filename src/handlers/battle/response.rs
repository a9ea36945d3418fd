//! Battle response DTOs

use serde::Serialize;

use crate::models::{BattleRoom, Challenge, ParticipantId, SubmissionReport};

/// `join-queue` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueResponse {
    pub success: bool,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    /// Template for the default language, when the challenge has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<ParticipantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
}

/// `check-battle` response
#[derive(Debug, Serialize)]
pub struct CheckBattleResponse {
    pub success: bool,
    pub battle: BattleRoom,
}

/// `queue-status` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusResponse {
    pub success: bool,
    pub queued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battle_id: Option<String>,
}

/// `submit-code` response
#[derive(Debug, Serialize)]
pub struct SubmitCodeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SubmissionReport,
}

/// `leave-queue` response
#[derive(Debug, Serialize)]
pub struct LeaveQueueResponse {
    pub success: bool,
    pub removed: bool,
}
