//! In-process store
//!
//! Suitable for a single instance and for tests. State is lost on restart.
//! Queue, rooms and the participant index share one lock, so pairing and the
//! reservation of the pair's battle happen in the same critical section.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{BattleRoom, CompletionReason, JoinOutcome, ParticipantId, QueuedParticipant},
};

use super::{QueueStore, RoomStore};

#[derive(Debug, Default)]
struct StoreState {
    queue: VecDeque<QueuedParticipant>,
    rooms: HashMap<String, BattleRoom>,
    /// participant -> id of the battle they play in, set from the moment they are paired
    matched: HashMap<ParticipantId, String>,
}

impl StoreState {
    fn is_queued(&self, participant: &ParticipantId) -> bool {
        self.queue.iter().any(|e| &e.participant == participant)
    }
}

/// Queue and room registry behind a single mutex
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn room_count(&self) -> usize {
        self.state.lock().await.rooms.len()
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn join(
        &self,
        participant: &ParticipantId,
        now: DateTime<Utc>,
        battle_id: &str,
    ) -> AppResult<JoinOutcome> {
        let mut state = self.state.lock().await;

        if let Some(battle_id) = state.matched.get(participant) {
            return Ok(JoinOutcome::Matched {
                battle_id: battle_id.clone(),
            });
        }

        if state.is_queued(participant) {
            return Ok(JoinOutcome::AlreadyQueued);
        }

        state.queue.push_back(QueuedParticipant {
            participant: participant.clone(),
            joined_at: now,
        });

        if state.queue.len() >= 2 {
            if let (Some(first), Some(second)) = (state.queue.pop_front(), state.queue.pop_front())
            {
                for entry in [&first, &second] {
                    state
                        .matched
                        .insert(entry.participant.clone(), battle_id.to_string());
                }
                return Ok(JoinOutcome::Paired {
                    first: first.participant,
                    second: second.participant,
                });
            }
        }

        Ok(JoinOutcome::Queued {
            position: state.queue.len(),
        })
    }

    async fn requeue_front(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let StoreState {
            queue,
            rooms,
            matched,
        } = &mut *state;

        for participant in [first, second] {
            if matched
                .get(participant)
                .is_some_and(|id| !rooms.contains_key(id))
            {
                matched.remove(participant);
            }
        }

        // Reverse order so the earliest arrival ends up at the head
        for participant in [second, first] {
            let queued = queue.iter().any(|e| &e.participant == participant);
            if !queued && !matched.contains_key(participant) {
                queue.push_front(QueuedParticipant {
                    participant: participant.clone(),
                    joined_at: now,
                });
            }
        }

        Ok(())
    }

    async fn leave(&self, participant: &ParticipantId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.queue.len();
        state.queue.retain(|e| &e.participant != participant);
        Ok(state.queue.len() != before)
    }

    async fn position(&self, participant: &ParticipantId) -> AppResult<Option<usize>> {
        let state = self.state.lock().await;
        Ok(state
            .queue
            .iter()
            .position(|e| &e.participant == participant)
            .map(|idx| idx + 1))
    }

    async fn evict_idle(&self, joined_before: DateTime<Utc>) -> AppResult<Vec<ParticipantId>> {
        let mut state = self.state.lock().await;
        let mut evicted = Vec::new();

        state.queue.retain(|e| {
            if e.joined_at <= joined_before {
                evicted.push(e.participant.clone());
                false
            } else {
                true
            }
        });

        Ok(evicted)
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.state.lock().await.queue.len())
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert(&self, room: BattleRoom) -> AppResult<()> {
        let mut state = self.state.lock().await;

        if state.rooms.contains_key(&room.id) {
            return Err(AppError::Conflict(format!("Battle id {} is taken", room.id)));
        }

        if !room.is_completed() {
            for participant in &room.participants {
                state.matched.insert(participant.clone(), room.id.clone());
            }
        }
        state.rooms.insert(room.id.clone(), room);

        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<BattleRoom>> {
        Ok(self.state.lock().await.rooms.get(id).cloned())
    }

    async fn complete(
        &self,
        id: &str,
        winner: Option<ParticipantId>,
        reason: CompletionReason,
        at: DateTime<Utc>,
    ) -> AppResult<BattleRoom> {
        let mut state = self.state.lock().await;
        let StoreState { rooms, matched, .. } = &mut *state;

        let room = rooms
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Battle not found".to_string()))?;

        room.complete(winner, reason, at)?;

        for participant in &room.participants {
            if matched.get(participant) == Some(&room.id) {
                matched.remove(participant);
            }
        }

        Ok(room.clone())
    }

    async fn active_room_for(&self, participant: &ParticipantId) -> AppResult<Option<BattleRoom>> {
        let state = self.state.lock().await;
        Ok(state
            .matched
            .get(participant)
            .and_then(|id| state.rooms.get(id))
            .filter(|room| !room.is_completed())
            .cloned())
    }

    async fn overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state
            .rooms
            .values()
            .filter(|room| room.is_overdue(now))
            .map(|room| room.id.clone())
            .collect())
    }

    async fn evict_completed(&self, completed_before: DateTime<Utc>) -> AppResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.rooms.len();

        state.rooms.retain(|_, room| {
            !matches!(room.completed_at, Some(at) if room.is_completed() && at <= completed_before)
        });

        Ok(before - state.rooms.len())
    }
}
