//! Battle handler implementations

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::{
    constants::actions,
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    services::{JoinResult, Submission},
    state::AppState,
};

use super::{
    request::{BattleActionRequest, BattleQuery},
    response::{
        CheckBattleResponse, JoinQueueResponse, LeaveQueueResponse, QueueStatusResponse,
        SubmitCodeResponse,
    },
};

/// `GET /battle?action=...`
pub async fn battle_query(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    query: Result<Query<BattleQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    match query.action.as_deref() {
        Some(actions::JOIN_QUEUE) => join_queue(&state, &auth_user).await,
        Some(actions::CHECK_BATTLE) => {
            let battle_id = required(query.battle_id, "battleId")?;
            let battle = state.rooms().get(&battle_id).await?;
            Ok(Json(CheckBattleResponse {
                success: true,
                battle,
            })
            .into_response())
        }
        Some(actions::QUEUE_STATUS) => {
            let status = state.matchmaking().status(&auth_user.participant).await?;
            Ok(Json(QueueStatusResponse {
                success: true,
                queued: status.position.is_some(),
                queue_position: status.position,
                battle_id: status.battle_id,
            })
            .into_response())
        }
        Some(other) => Err(AppError::InvalidInput(format!("Unknown action: {}", other))),
        None => Err(AppError::InvalidInput("Missing action".to_string())),
    }
}

/// `POST /battle {action, ...}`
pub async fn battle_action(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    payload: Result<Json<BattleActionRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    payload.validate()?;

    match payload.action.as_str() {
        actions::SUBMIT_CODE => {
            let submission = Submission {
                battle_id: required(payload.battle_id, "battleId")?,
                participant: auth_user.participant,
                language: payload.language,
                source: required(payload.code, "code")?,
            };

            let report = state.evaluator().submit(submission).await?;
            Ok(Json(SubmitCodeResponse {
                success: true,
                report,
            })
            .into_response())
        }
        actions::LEAVE_QUEUE => {
            let removed = state.matchmaking().leave(&auth_user.participant).await?;
            Ok(Json(LeaveQueueResponse {
                success: true,
                removed,
            })
            .into_response())
        }
        other => Err(AppError::InvalidInput(format!("Unknown action: {}", other))),
    }
}

async fn join_queue(state: &AppState, auth_user: &AuthenticatedUser) -> AppResult<Response> {
    let response = match state.matchmaking().join(&auth_user.participant).await? {
        JoinResult::Waiting { position } => JoinQueueResponse {
            success: true,
            matched: false,
            battle_id: None,
            challenge: None,
            starter_code: None,
            opponent: None,
            queue_position: Some(position),
        },
        // Paired; the room shows up on the next poll
        JoinResult::Pending { .. } => JoinQueueResponse {
            success: true,
            matched: false,
            battle_id: None,
            challenge: None,
            starter_code: None,
            opponent: None,
            queue_position: None,
        },
        JoinResult::Matched { room, opponent } => JoinQueueResponse {
            success: true,
            matched: true,
            starter_code: room
                .challenge
                .starter_for(&state.config().battle.default_language)
                .map(str::to_string),
            battle_id: Some(room.id),
            challenge: Some(room.challenge),
            opponent: Some(opponent),
            queue_position: None,
        },
    };

    Ok(Json(response).into_response())
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing {}", name)))
}
