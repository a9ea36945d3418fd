//! Redis-backed stores
//!
//! Shared state for running several service instances. Each compound operation
//! is a Lua script, which Redis executes atomically.
//!
//! Key layout (all under the configured prefix):
//! - `{p}:queue` sorted set of participants scored by arrival sequence
//! - `{p}:queue:seq` arrival counter
//! - `{p}:queue:joined` hash participant -> join time (unix millis)
//! - `{p}:room:{id}` room JSON, `{p}:room:{id}:status` `active | completed`
//! - `{p}:rooms:deadlines` sorted set of active room ids scored by deadline
//! - `{p}:participant:{id}` id of the participant's battle, written when the
//!   pair is popped and removed when the battle completes
//!
//! Scripts derive participant and room keys from the prefix, so the layout
//! assumes a single Redis node.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};

use crate::{
    error::{AppError, AppResult},
    models::{BattleRoom, CompletionReason, JoinOutcome, ParticipantId},
};

use super::{QueueStore, RoomStore};

static JOIN_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local matched = redis.call('GET', KEYS[4])
        if matched then
            return {'matched', matched}
        end
        if redis.call('ZSCORE', KEYS[1], ARGV[1]) then
            return {'dup'}
        end
        local seq = redis.call('INCR', KEYS[2])
        redis.call('ZADD', KEYS[1], seq, ARGV[1])
        redis.call('HSET', KEYS[3], ARGV[1], ARGV[2])
        if redis.call('ZCARD', KEYS[1]) >= 2 then
            local pair = redis.call('ZRANGE', KEYS[1], 0, 1)
            redis.call('ZREM', KEYS[1], pair[1], pair[2])
            redis.call('HDEL', KEYS[3], pair[1], pair[2])
            redis.call('SET', ARGV[3] .. ':participant:' .. pair[1], ARGV[4])
            redis.call('SET', ARGV[3] .. ':participant:' .. pair[2], ARGV[4])
            return {'paired', pair[1], pair[2]}
        end
        return {'queued', tostring(redis.call('ZRANK', KEYS[1], ARGV[1]) + 1)}
        "#,
    )
});

static REQUEUE_FRONT_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local head = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
        local score
        if #head == 0 then
            score = tonumber(redis.call('INCR', KEYS[2]))
        else
            score = tonumber(head[2])
        end
        for i = 2, 1, -1 do
            local participant = ARGV[i]
            local participant_key = ARGV[3] .. ':participant:' .. participant
            local room_id = redis.call('GET', participant_key)
            if room_id and redis.call('EXISTS', ARGV[3] .. ':room:' .. room_id .. ':status') == 0 then
                redis.call('DEL', participant_key)
                room_id = false
            end
            if not room_id and not redis.call('ZSCORE', KEYS[1], participant) then
                score = score - 1
                redis.call('ZADD', KEYS[1], score, participant)
                redis.call('HSET', KEYS[3], participant, ARGV[4])
            end
        end
        return 1
        "#,
    )
});

static EVICT_IDLE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local joined = redis.call('HGET', KEYS[2], ARGV[1])
        if joined and tonumber(joined) <= tonumber(ARGV[2]) then
            redis.call('ZREM', KEYS[1], ARGV[1])
            redis.call('HDEL', KEYS[2], ARGV[1])
            return 1
        end
        return 0
        "#,
    )
});

static INSERT_ROOM_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        if redis.call('EXISTS', KEYS[2]) == 1 then
            return 0
        end
        redis.call('SET', KEYS[1], ARGV[1])
        redis.call('SET', KEYS[2], 'active')
        redis.call('ZADD', KEYS[3], ARGV[3], ARGV[2])
        redis.call('SET', KEYS[4], ARGV[2])
        redis.call('SET', KEYS[5], ARGV[2])
        return 1
        "#,
    )
});

static COMPLETE_ROOM_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local status = redis.call('GET', KEYS[2])
        if not status then
            return 'missing'
        end
        if status ~= 'active' then
            return 'completed'
        end
        redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
        redis.call('SET', KEYS[2], 'completed', 'EX', ARGV[2])
        redis.call('ZREM', KEYS[3], ARGV[3])
        for i = 4, #KEYS do
            if redis.call('GET', KEYS[i]) == ARGV[3] then
                redis.call('DEL', KEYS[i])
            end
        end
        return 'ok'
        "#,
    )
});

/// Key names under one prefix
#[derive(Debug, Clone)]
struct KeySpace {
    prefix: String,
}

impl KeySpace {
    fn queue(&self) -> String {
        format!("{}:queue", self.prefix)
    }

    fn queue_seq(&self) -> String {
        format!("{}:queue:seq", self.prefix)
    }

    fn queue_joined(&self) -> String {
        format!("{}:queue:joined", self.prefix)
    }

    fn room(&self, id: &str) -> String {
        format!("{}:room:{}", self.prefix, id)
    }

    fn room_status(&self, id: &str) -> String {
        format!("{}:room:{}:status", self.prefix, id)
    }

    fn deadlines(&self) -> String {
        format!("{}:rooms:deadlines", self.prefix)
    }

    fn participant(&self, participant: &ParticipantId) -> String {
        format!("{}:participant:{}", self.prefix, participant)
    }
}

/// Queue and room store sharing one Redis connection
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    keys: KeySpace,
    /// Seconds a completed room is kept before Redis expires it
    completed_ttl_secs: u64,
}

impl RedisStore {
    /// Connect and verify the server answers
    pub async fn connect(url: &str, prefix: &str, completed_ttl_secs: u64) -> AppResult<Self> {
        let client = Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(Self {
            conn,
            keys: KeySpace {
                prefix: prefix.to_string(),
            },
            completed_ttl_secs: completed_ttl_secs.max(1),
        })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn join(
        &self,
        participant: &ParticipantId,
        now: DateTime<Utc>,
        battle_id: &str,
    ) -> AppResult<JoinOutcome> {
        let mut conn = self.conn();
        let reply: Vec<String> = JOIN_SCRIPT
            .key(self.keys.queue())
            .key(self.keys.queue_seq())
            .key(self.keys.queue_joined())
            .key(self.keys.participant(participant))
            .arg(participant.as_str())
            .arg(now.timestamp_millis())
            .arg(&self.keys.prefix)
            .arg(battle_id)
            .invoke_async(&mut conn)
            .await?;

        parse_join_reply(&reply)
    }

    async fn requeue_front(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut conn = self.conn();
        let _: i64 = REQUEUE_FRONT_SCRIPT
            .key(self.keys.queue())
            .key(self.keys.queue_seq())
            .key(self.keys.queue_joined())
            .arg(first.as_str())
            .arg(second.as_str())
            .arg(&self.keys.prefix)
            .arg(now.timestamp_millis())
            .invoke_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn leave(&self, participant: &ParticipantId) -> AppResult<bool> {
        let mut conn = self.conn();
        let (removed, _): (i64, i64) = redis::pipe()
            .atomic()
            .zrem(self.keys.queue(), participant.as_str())
            .hdel(self.keys.queue_joined(), participant.as_str())
            .query_async(&mut conn)
            .await?;

        Ok(removed > 0)
    }

    async fn position(&self, participant: &ParticipantId) -> AppResult<Option<usize>> {
        let mut conn = self.conn();
        let rank: Option<usize> = conn.zrank(self.keys.queue(), participant.as_str()).await?;
        Ok(rank.map(|r| r + 1))
    }

    async fn evict_idle(&self, joined_before: DateTime<Utc>) -> AppResult<Vec<ParticipantId>> {
        let mut conn = self.conn();
        let joined: HashMap<String, i64> = conn.hgetall(self.keys.queue_joined()).await?;
        let cutoff = joined_before.timestamp_millis();

        let mut evicted = Vec::new();
        for (raw, at) in joined {
            if at > cutoff {
                continue;
            }

            // Re-checked inside the script; the entry may have been paired meanwhile
            let removed: i64 = EVICT_IDLE_SCRIPT
                .key(self.keys.queue())
                .key(self.keys.queue_joined())
                .arg(&raw)
                .arg(cutoff)
                .invoke_async(&mut conn)
                .await?;

            if removed == 1 {
                evicted.push(ParticipantId::new(&raw)?);
            }
        }

        Ok(evicted)
    }

    async fn len(&self) -> AppResult<usize> {
        let mut conn = self.conn();
        let len: usize = conn.zcard(self.keys.queue()).await?;
        Ok(len)
    }
}

#[async_trait]
impl RoomStore for RedisStore {
    async fn insert(&self, room: BattleRoom) -> AppResult<()> {
        let mut conn = self.conn();
        let json = serde_json::to_string(&room)?;
        let [first, second] = &room.participants;

        let inserted: i64 = INSERT_ROOM_SCRIPT
            .key(self.keys.room(&room.id))
            .key(self.keys.room_status(&room.id))
            .key(self.keys.deadlines())
            .key(self.keys.participant(first))
            .key(self.keys.participant(second))
            .arg(json)
            .arg(&room.id)
            .arg(room.deadline.timestamp_millis())
            .invoke_async(&mut conn)
            .await?;

        if inserted == 0 {
            return Err(AppError::Conflict(format!("Battle id {} is taken", room.id)));
        }

        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<BattleRoom>> {
        let mut conn = self.conn();
        let raw: Option<String> = conn.get(self.keys.room(id)).await?;

        raw.map(|json| serde_json::from_str(&json).map_err(AppError::from))
            .transpose()
    }

    async fn complete(
        &self,
        id: &str,
        winner: Option<ParticipantId>,
        reason: CompletionReason,
        at: DateTime<Utc>,
    ) -> AppResult<BattleRoom> {
        let room = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Battle not found".to_string()))?;

        // Participants and challenge never change, so the snapshot is safe to
        // write back as long as the status guard in the script holds.
        let mut completed = room;
        completed.complete(winner, reason, at)?;
        let json = serde_json::to_string(&completed)?;
        let [first, second] = &completed.participants;

        let mut conn = self.conn();
        let reply: String = COMPLETE_ROOM_SCRIPT
            .key(self.keys.room(id))
            .key(self.keys.room_status(id))
            .key(self.keys.deadlines())
            .key(self.keys.participant(first))
            .key(self.keys.participant(second))
            .arg(json)
            .arg(self.completed_ttl_secs)
            .arg(id)
            .invoke_async(&mut conn)
            .await?;

        match reply.as_str() {
            "ok" => Ok(completed),
            "completed" => Err(AppError::AlreadyCompleted),
            "missing" => Err(AppError::NotFound("Battle not found".to_string())),
            other => Err(anyhow::anyhow!("Unexpected reply from complete script: {}", other).into()),
        }
    }

    async fn active_room_for(&self, participant: &ParticipantId) -> AppResult<Option<BattleRoom>> {
        let mut conn = self.conn();
        let room_id: Option<String> = conn.get(self.keys.participant(participant)).await?;

        let Some(room_id) = room_id else {
            return Ok(None);
        };

        Ok(self
            .get(&room_id)
            .await?
            .filter(|room| !room.is_completed()))
    }

    async fn overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<String>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn
            .zrangebyscore(self.keys.deadlines(), "-inf", now.timestamp_millis())
            .await?;
        Ok(ids)
    }

    async fn evict_completed(&self, _completed_before: DateTime<Utc>) -> AppResult<usize> {
        // Completed room keys carry a TTL; Redis expires them on its own
        Ok(0)
    }
}

fn parse_join_reply(reply: &[String]) -> AppResult<JoinOutcome> {
    match reply {
        [tag] if tag == "dup" => Ok(JoinOutcome::AlreadyQueued),
        [tag, battle_id] if tag == "matched" => Ok(JoinOutcome::Matched {
            battle_id: battle_id.clone(),
        }),
        [tag, position] if tag == "queued" => {
            let position = position
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid queue position: {}", position))?;
            Ok(JoinOutcome::Queued { position })
        }
        [tag, first, second] if tag == "paired" => Ok(JoinOutcome::Paired {
            first: ParticipantId::new(first)?,
            second: ParticipantId::new(second)?,
        }),
        other => Err(anyhow::anyhow!("Unexpected reply from join script: {:?}", other).into()),
    }
}
