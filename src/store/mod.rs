//! State stores for the matchmaking queue and battle rooms
//!
//! Every read-modify-write the services need is a single trait method, so each
//! implementation can make it atomic: one critical section in memory, one Lua
//! script or `MULTI` block in Redis.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{BattleRoom, CompletionReason, JoinOutcome, ParticipantId},
};

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// FIFO queue of participants waiting for an opponent
///
/// The queue also sees the participant -> battle index, so a participant who
/// was just paired can never be queued again before their room exists.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Append `participant` and, if two or more are waiting, pop the two oldest
    /// and reserve both under `battle_id`
    ///
    /// A participant who already has an active or reserved battle gets
    /// `Matched` and the queue is left untouched.
    async fn join(
        &self,
        participant: &ParticipantId,
        now: DateTime<Utc>,
        battle_id: &str,
    ) -> AppResult<JoinOutcome>;

    /// Put a pair whose room could not be created back at the head, earliest
    /// arrival first, dropping reservations that never became a room
    async fn requeue_front(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Remove `participant`; returns whether it was queued
    async fn leave(&self, participant: &ParticipantId) -> AppResult<bool>;

    /// 1-based position from the head, if queued
    async fn position(&self, participant: &ParticipantId) -> AppResult<Option<usize>>;

    /// Remove every entry that joined at or before `joined_before`
    async fn evict_idle(&self, joined_before: DateTime<Utc>) -> AppResult<Vec<ParticipantId>>;

    async fn len(&self) -> AppResult<usize>;
}

/// Registry of battle rooms keyed by id
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Store a new room; `Conflict` if the id is taken
    async fn insert(&self, room: BattleRoom) -> AppResult<()>;

    async fn get(&self, id: &str) -> AppResult<Option<BattleRoom>>;

    /// Compare-and-set `active -> completed`
    ///
    /// Fails with `NotFound` for unknown ids and `AlreadyCompleted` when another
    /// writer got there first. Returns the completed room.
    async fn complete(
        &self,
        id: &str,
        winner: Option<ParticipantId>,
        reason: CompletionReason,
        at: DateTime<Utc>,
    ) -> AppResult<BattleRoom>;

    /// The in-flight room `participant` plays in, if any
    async fn active_room_for(&self, participant: &ParticipantId) -> AppResult<Option<BattleRoom>>;

    /// Ids of active rooms whose deadline is at or before `now`
    async fn overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<String>>;

    /// Drop completed rooms that finished at or before `completed_before`
    async fn evict_completed(&self, completed_before: DateTime<Utc>) -> AppResult<usize>;
}
