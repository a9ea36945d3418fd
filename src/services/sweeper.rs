//! Background housekeeping
//!
//! Evicts idle queue entries, times out battles past their deadline and drops
//! completed rooms once their TTL has elapsed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    error::AppError,
    utils::{now_utc, time::cutoff},
};

use super::{MatchmakingService, RoomService};

/// What one sweep pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub queue_evicted: usize,
    pub rooms_expired: usize,
    pub rooms_evicted: usize,
}

impl SweepStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone)]
pub struct Sweeper {
    matchmaking: MatchmakingService,
    rooms: RoomService,
    queue_idle_timeout: Duration,
    completed_room_ttl: Duration,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        matchmaking: MatchmakingService,
        rooms: RoomService,
        queue_idle_timeout: Duration,
        completed_room_ttl: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            matchmaking,
            rooms,
            queue_idle_timeout,
            completed_room_ttl,
            interval,
        }
    }

    /// Run one pass. A failing step is logged and the others still run.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        match self
            .matchmaking
            .evict_idle(cutoff(now, self.queue_idle_timeout))
            .await
        {
            Ok(evicted) => stats.queue_evicted = evicted.len(),
            Err(e) => tracing::error!(error = %e, "Failed to evict idle queue entries"),
        }

        match self.rooms.overdue(now).await {
            Ok(ids) => {
                for id in ids {
                    match self.rooms.expire(&id, now).await {
                        Ok(_) => stats.rooms_expired += 1,
                        // Someone won between the scan and the write
                        Err(AppError::AlreadyCompleted) | Err(AppError::NotFound(_)) => {}
                        Err(e) => tracing::error!(battle_id = %id, error = %e, "Failed to expire battle"),
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to scan for overdue battles"),
        }

        match self
            .rooms
            .evict_completed(cutoff(now, self.completed_room_ttl))
            .await
        {
            Ok(evicted) => stats.rooms_evicted = evicted,
            Err(e) => tracing::error!(error = %e, "Failed to evict completed battles"),
        }

        stats
    }

    /// Sweep every interval until `shutdown` flips to true or its sender drops
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = self.interval.as_secs(), "Sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let stats = self.sweep(now_utc()).await;
                    if stats.is_empty() {
                        tracing::trace!("Sweep found nothing to do");
                    } else {
                        tracing::info!(
                            queue_evicted = stats.queue_evicted,
                            rooms_expired = stats.rooms_expired,
                            rooms_evicted = stats.rooms_evicted,
                            "Sweep completed"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Sweeper stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::{
        models::{CompletionReason, RoomStatus},
        services::JoinResult,
        store::{MemoryStore, QueueStore},
        test_utils::{participant, single_challenge_catalog},
    };

    struct Harness {
        queue: Arc<MemoryStore>,
        matchmaking: MatchmakingService,
        rooms: RoomService,
        sweeper: Sweeper,
    }

    fn harness() -> Harness {
        let queue = Arc::new(MemoryStore::new());
        let rooms = RoomService::new(queue.clone(), Arc::new(single_challenge_catalog()));
        let matchmaking = MatchmakingService::new(queue.clone(), rooms.clone());
        let sweeper = Sweeper::new(
            matchmaking.clone(),
            rooms.clone(),
            Duration::from_secs(300),
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );
        Harness {
            queue,
            matchmaking,
            rooms,
            sweeper,
        }
    }

    #[tokio::test]
    async fn test_idle_entries_are_evicted() {
        let h = harness();
        let now = now_utc();
        h.queue
            .join(
                &participant("sleepy"),
                now - ChronoDuration::minutes(10),
                "battle_idle",
            )
            .await
            .unwrap();

        let stats = h.sweeper.sweep(now - ChronoDuration::minutes(6)).await;
        assert_eq!(stats.queue_evicted, 0);

        let stats = h.sweeper.sweep(now).await;
        assert_eq!(stats.queue_evicted, 1);
        assert_eq!(h.matchmaking.queue_len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overdue_room_times_out_then_is_evicted() {
        let h = harness();
        h.matchmaking.join(&participant("alice")).await.unwrap();
        let JoinResult::Matched { room, .. } = h.matchmaking.join(&participant("bob")).await.unwrap()
        else {
            panic!("expected a match");
        };

        let before_deadline = h.sweeper.sweep(room.deadline - ChronoDuration::seconds(1)).await;
        assert!(before_deadline.is_empty());

        let stats = h.sweeper.sweep(room.deadline).await;
        assert_eq!(stats.rooms_expired, 1);

        let expired = h.rooms.get(&room.id).await.unwrap();
        assert_eq!(expired.status, RoomStatus::Completed);
        assert_eq!(expired.winner, None);
        assert_eq!(expired.completion_reason, Some(CompletionReason::TimedOut));

        let stats = h
            .sweeper
            .sweep(room.deadline + ChronoDuration::hours(2))
            .await;
        assert_eq!(stats.rooms_evicted, 1);
        assert!(matches!(
            h.rooms.get(&room.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let h = harness();
        let (tx, rx) = watch::channel(false);
        let handle = h.sweeper.clone().spawn(rx);

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
