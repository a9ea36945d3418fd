//! Matchmaking service
//!
//! FIFO pairing on top of a [`QueueStore`]. Enqueue, pairing and the
//! reservation of the pair's battle id happen in one store operation; the
//! room itself is created right after under the reserved id.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{BattleRoom, JoinOutcome, ParticipantId},
    store::QueueStore,
    utils::{generate_battle_id, now_utc},
};

use super::RoomService;

/// What a caller learns from joining
#[derive(Debug, Clone, PartialEq)]
pub enum JoinResult {
    /// Still waiting; 1-based position in the queue
    Waiting { position: usize },
    /// Paired, but the battle room is still being created; poll again
    Pending { battle_id: String },
    /// Paired, either just now or earlier while the caller was polling
    Matched {
        room: BattleRoom,
        opponent: ParticipantId,
    },
}

/// Where a participant currently stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatus {
    pub position: Option<usize>,
    pub battle_id: Option<String>,
}

#[derive(Clone)]
pub struct MatchmakingService {
    queue: Arc<dyn QueueStore>,
    rooms: RoomService,
}

impl MatchmakingService {
    pub fn new(queue: Arc<dyn QueueStore>, rooms: RoomService) -> Self {
        Self { queue, rooms }
    }

    /// Join the queue, pairing with the earliest waiting participant if any
    pub async fn join(&self, participant: &ParticipantId) -> AppResult<JoinResult> {
        let now = now_utc();
        let battle_id = generate_battle_id(now);

        match self.queue.join(participant, now, &battle_id).await? {
            JoinOutcome::AlreadyQueued => Err(AppError::AlreadyQueued),
            JoinOutcome::Queued { position } => {
                tracing::info!(participant = %participant, position, "Participant queued");
                Ok(JoinResult::Waiting { position })
            }
            JoinOutcome::Matched { battle_id } => match self.rooms.find(&battle_id).await? {
                Some(room) if !room.is_completed() => matched(room, participant),
                _ => Ok(JoinResult::Pending { battle_id }),
            },
            JoinOutcome::Paired { first, second } => {
                let room = self.create_room(first, second, battle_id, now).await?;

                if room.has_participant(participant) {
                    return matched(room, participant);
                }

                match self.queue.position(participant).await? {
                    Some(position) => Ok(JoinResult::Waiting { position }),
                    None => Err(AppError::Conflict(
                        "Participant left the queue while joining".to_string(),
                    )),
                }
            }
        }
    }

    /// Open the room for a reserved pair, putting the pair back at the head of
    /// the queue if that fails
    async fn create_room(
        &self,
        first: ParticipantId,
        second: ParticipantId,
        battle_id: String,
        now: DateTime<Utc>,
    ) -> AppResult<BattleRoom> {
        match self
            .rooms
            .create(first.clone(), second.clone(), battle_id)
            .await
        {
            Ok(room) => Ok(room),
            Err(e) => {
                tracing::error!(
                    first = %first,
                    second = %second,
                    error = %e,
                    "Battle room creation failed, requeueing pair"
                );
                if let Err(requeue) = self.queue.requeue_front(&first, &second, now).await {
                    tracing::error!(error = %requeue, "Failed to requeue pair");
                }
                Err(e)
            }
        }
    }

    /// Leave the queue; returns whether an entry was removed
    pub async fn leave(&self, participant: &ParticipantId) -> AppResult<bool> {
        let removed = self.queue.leave(participant).await?;
        if removed {
            tracing::info!(participant = %participant, "Participant left the queue");
        }
        Ok(removed)
    }

    pub async fn status(&self, participant: &ParticipantId) -> AppResult<QueueStatus> {
        if let Some(position) = self.queue.position(participant).await? {
            return Ok(QueueStatus {
                position: Some(position),
                battle_id: None,
            });
        }

        let battle_id = self
            .rooms
            .active_room_for(participant)
            .await?
            .map(|room| room.id);

        Ok(QueueStatus {
            position: None,
            battle_id,
        })
    }

    pub async fn queue_len(&self) -> AppResult<usize> {
        self.queue.len().await
    }

    /// Drop entries that joined at or before `joined_before`
    pub async fn evict_idle(&self, joined_before: DateTime<Utc>) -> AppResult<Vec<ParticipantId>> {
        let evicted = self.queue.evict_idle(joined_before).await?;
        for participant in &evicted {
            tracing::info!(participant = %participant, "Evicted idle participant from queue");
        }
        Ok(evicted)
    }
}

fn matched(room: BattleRoom, participant: &ParticipantId) -> AppResult<JoinResult> {
    let opponent = room
        .opponent_of(participant)
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Battle {} does not include participant {}",
                room.id,
                participant
            )
        })?;

    Ok(JoinResult::Matched { room, opponent })
}
