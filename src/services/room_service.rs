//! Battle room registry

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    catalog::Catalog,
    constants::BATTLE_ID_ATTEMPTS,
    error::{AppError, AppResult},
    models::{BattleRoom, CompletionReason, ParticipantId},
    store::RoomStore,
    utils::{generate_battle_id, now_utc},
};

/// Owns the lifecycle of every in-flight battle room
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn RoomStore>,
    catalog: Arc<Catalog>,
}

impl RoomService {
    pub fn new(store: Arc<dyn RoomStore>, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Open an active room for two freshly paired participants
    ///
    /// `reserved_id` is the id the queue reserved the pair under; a fresh id is
    /// drawn only if it turns out to be taken.
    pub async fn create(
        &self,
        first: ParticipantId,
        second: ParticipantId,
        reserved_id: String,
    ) -> AppResult<BattleRoom> {
        let challenge = self.catalog.pick_random()?;
        let now = now_utc();
        let mut id = reserved_id;

        for attempt in 1..=BATTLE_ID_ATTEMPTS {
            let room = BattleRoom::start(
                std::mem::replace(&mut id, generate_battle_id(now)),
                [first.clone(), second.clone()],
                challenge.clone(),
                now,
            );

            match self.store.insert(room.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        battle_id = %room.id,
                        challenge = %room.challenge.id,
                        first = %first,
                        second = %second,
                        "Battle room created"
                    );
                    return Ok(room);
                }
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(attempt, "Battle id collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a unique battle id".to_string(),
        ))
    }

    /// Get a room by id, `None` if it does not exist (yet or anymore)
    pub async fn find(&self, id: &str) -> AppResult<Option<BattleRoom>> {
        self.store.get(id).await
    }

    /// Get a room by id
    pub async fn get(&self, id: &str) -> AppResult<BattleRoom> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Battle not found".to_string()))
    }

    /// Declare `winner`; rejected with `AlreadyCompleted` if the room is done
    pub async fn record_result(&self, id: &str, winner: &ParticipantId) -> AppResult<BattleRoom> {
        let room = self
            .store
            .complete(id, Some(winner.clone()), CompletionReason::Solved, now_utc())
            .await?;

        tracing::info!(battle_id = %id, winner = %winner, "Battle completed");
        Ok(room)
    }

    /// Close a room nobody solved in time
    pub async fn expire(&self, id: &str, at: DateTime<Utc>) -> AppResult<BattleRoom> {
        let room = self
            .store
            .complete(id, None, CompletionReason::TimedOut, at)
            .await?;

        tracing::info!(battle_id = %id, "Battle timed out without a winner");
        Ok(room)
    }

    pub async fn active_room_for(&self, participant: &ParticipantId) -> AppResult<Option<BattleRoom>> {
        self.store.active_room_for(participant).await
    }

    /// Ids of active rooms past their deadline
    pub async fn overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<String>> {
        self.store.overdue(now).await
    }

    pub async fn evict_completed(&self, completed_before: DateTime<Utc>) -> AppResult<usize> {
        self.store.evict_completed(completed_before).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::RoomStatus,
        store::MemoryStore,
        test_utils::{participant, sample_room, single_challenge_catalog},
    };

    fn service() -> RoomService {
        RoomService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(single_challenge_catalog()),
        )
    }

    #[tokio::test]
    async fn test_create_starts_active_room() {
        let rooms = service();
        let room = rooms
            .create(participant("alice"), participant("bob"), "battle_1_test".to_string())
            .await
            .unwrap();

        assert_eq!(room.status, RoomStatus::Active);
        assert_eq!(room.participants, [participant("alice"), participant("bob")]);
        assert_eq!(room.started_at, room.created_at);
        assert_eq!(room.id, "battle_1_test");
    }

    #[tokio::test]
    async fn test_taken_reserved_id_falls_back_to_fresh_id() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(sample_room("battle_taken", "carol", "dave"))
            .await
            .unwrap();
        let rooms = RoomService::new(store, Arc::new(single_challenge_catalog()));

        let room = rooms
            .create(participant("alice"), participant("bob"), "battle_taken".to_string())
            .await
            .unwrap();

        assert_ne!(room.id, "battle_taken");
        assert!(room.id.starts_with("battle_"));
        assert_eq!(rooms.get(&room.id).await.unwrap().participants[0], participant("alice"));
    }

    #[tokio::test]
    async fn test_get_returns_same_challenge() {
        let rooms = service();
        let room = rooms
            .create(participant("alice"), participant("bob"), "battle_1_test".to_string())
            .await
            .unwrap();

        let first = rooms.get(&room.id).await.unwrap();
        let second = rooms.get(&room.id).await.unwrap();
        assert_eq!(first.challenge, room.challenge);
        assert_eq!(second.challenge, room.challenge);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let err = service().get("nonexistent-id").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_second_result_is_rejected() {
        let rooms = service();
        let room = rooms
            .create(participant("alice"), participant("bob"), "battle_1_test".to_string())
            .await
            .unwrap();

        let done = rooms
            .record_result(&room.id, &participant("alice"))
            .await
            .unwrap();
        assert_eq!(done.winner, Some(participant("alice")));
        assert!(done.completed_at.is_some());

        for winner in ["alice", "bob"] {
            let err = rooms
                .record_result(&room.id, &participant(winner))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::AlreadyCompleted));
        }

        let stored = rooms.get(&room.id).await.unwrap();
        assert_eq!(stored.winner, Some(participant("alice")));
    }

    #[tokio::test]
    async fn test_expire_has_no_winner() {
        let rooms = service();
        let room = rooms
            .create(participant("alice"), participant("bob"), "battle_1_test".to_string())
            .await
            .unwrap();

        let expired = rooms.expire(&room.id, room.deadline).await.unwrap();
        assert_eq!(expired.status, RoomStatus::Completed);
        assert_eq!(expired.winner, None);
        assert_eq!(expired.completion_reason, Some(CompletionReason::TimedOut));
    }
}
