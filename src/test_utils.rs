//! Shared fixtures for unit tests

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    catalog::Catalog,
    config::{
        AuthConfig, BattleConfig, Config, MatchmakingConfig, RunnerBackend, RunnerConfig,
        ServerConfig, StoreBackend, StoreConfig,
    },
    error::AppResult,
    models::{BattleRoom, Challenge, Difficulty, ParticipantId, RunOutcome, TestCase},
    runner::CodeRunner,
    services::AuthService,
    state::AppState,
    store::MemoryStore,
};

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Source that [`ScriptedRunner`] accepts
pub const PASSING_SOURCE: &str = "// solved\nconsole.log(42);";
/// Source that [`ScriptedRunner`] rejects
pub const FAILING_SOURCE: &str = "console.log('no idea');";

pub fn participant(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

pub fn sample_challenge() -> Challenge {
    Challenge {
        id: "sum-two".to_string(),
        title: "Sum Two".to_string(),
        description: "Print the sum of two integers.".to_string(),
        difficulty: Difficulty::Easy,
        test_cases: vec![TestCase::new("1 2", "3"), TestCase::new("-4 10", "6")],
        starter_code: BTreeMap::from([(
            "javascript".to_string(),
            "function sum(a, b) {\n}\n".to_string(),
        )]),
        time_limit_secs: 600,
    }
}

pub fn single_challenge_catalog() -> Catalog {
    Catalog::new(vec![sample_challenge()]).unwrap()
}

pub fn sample_room(id: &str, first: &str, second: &str) -> BattleRoom {
    BattleRoom::start(
        id.to_string(),
        [participant(first), participant(second)],
        sample_challenge(),
        Utc::now(),
    )
}

/// Deterministic runner: every test passes iff the source contains `// solved`
pub struct ScriptedRunner;

#[async_trait]
impl CodeRunner for ScriptedRunner {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn run(
        &self,
        _language: &str,
        source: &str,
        test_case: &TestCase,
    ) -> AppResult<RunOutcome> {
        let stdout = if source.contains("// solved") {
            test_case.expected_output.clone()
        } else {
            "wrong".to_string()
        };

        Ok(RunOutcome {
            stdout,
            stderr: String::new(),
            exit_code: 0,
            duration_ms: 1.0,
            timed_out: false,
        })
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            log_format: "text".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
        },
        matchmaking: MatchmakingConfig {
            queue_idle_timeout_secs: 300,
        },
        battle: BattleConfig {
            completed_room_ttl_secs: 3600,
            sweep_interval_secs: 30,
            default_language: "javascript".to_string(),
            catalog_path: None,
            max_source_bytes: 4096,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "codeduel-test".to_string(),
        },
        runner: RunnerConfig {
            backend: RunnerBackend::Simulated,
            simulated_pass_rate: 1.0,
            time_limit_ms: 1000,
            memory_limit_mb: 64,
        },
    }
}

/// Memory-backed state with the scripted runner
pub fn test_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::new(
        test_config(),
        store.clone(),
        store,
        Arc::new(single_challenge_catalog()),
        Arc::new(ScriptedRunner),
    )
}

/// `Authorization` header value for `id`
pub fn bearer(id: &str) -> String {
    let token =
        AuthService::issue_token(&participant(id), TEST_JWT_SECRET, chrono::Duration::hours(1))
            .unwrap();
    format!("Bearer {}", token)
}
