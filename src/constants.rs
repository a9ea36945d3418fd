//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default log output format
pub const DEFAULT_LOG_FORMAT: &str = "text";

// =============================================================================
// MATCHMAKING DEFAULTS
// =============================================================================

/// Seconds a participant may wait in the queue before being dropped
pub const DEFAULT_QUEUE_IDLE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// BATTLE DEFAULTS
// =============================================================================

/// Seconds a completed room stays readable before eviction
pub const DEFAULT_COMPLETED_ROOM_TTL_SECS: u64 = 3600;

/// Seconds between background sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Battle time budget when a challenge does not specify one
pub const DEFAULT_CHALLENGE_TIME_LIMIT_SECS: u64 = 900;

/// Maximum accepted source code size in bytes
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 64 * 1024;

/// Number of attempts at allocating a fresh battle id
pub const BATTLE_ID_ATTEMPTS: usize = 3;

/// Length of the random suffix in battle ids
pub const BATTLE_ID_SUFFIX_LEN: usize = 9;

/// Maximum participant identifier length in bytes
pub const MAX_PARTICIPANT_ID_LENGTH: usize = 254;

// =============================================================================
// STORE DEFAULTS
// =============================================================================

/// Store backend identifiers
pub mod store_backends {
    pub const MEMORY: &str = "memory";
    pub const REDIS: &str = "redis";
}

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default prefix for every Redis key owned by the service
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "codeduel";

// =============================================================================
// RUNNER DEFAULTS
// =============================================================================

/// Code runner backend identifiers
pub mod runner_backends {
    pub const SIMULATED: &str = "simulated";
    pub const DOCKER: &str = "docker";
}

/// Probability that the simulated runner passes a test case
pub const DEFAULT_SIMULATED_PASS_RATE: f64 = 0.7;

/// Default per-test time limit in milliseconds
pub const DEFAULT_RUN_TIME_LIMIT_MS: u64 = 2000;

/// Default container memory limit in megabytes
pub const DEFAULT_RUN_MEMORY_LIMIT_MB: u64 = 256;

/// Exit code reported by coreutils `timeout`
pub const TIMEOUT_EXIT_CODE: i64 = 124;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const JAVASCRIPT: &str = "javascript";
    pub const PYTHON: &str = "python";
    pub const CPP: &str = "cpp";
    pub const RUST: &str = "rust";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[JAVASCRIPT, PYTHON, CPP, RUST];
}

/// Default submission language
pub const DEFAULT_LANGUAGE: &str = languages::JAVASCRIPT;

/// Container images for each language
pub mod container_images {
    pub const JAVASCRIPT: &str = "node:20-slim";
    pub const PYTHON: &str = "python:3.12-slim";
    pub const CPP: &str = "gcc:13";
    pub const RUST: &str = "rust:1.80-slim";
}

// =============================================================================
// BATTLE ACTIONS
// =============================================================================

/// Values accepted in the `action` field of battle requests
pub mod actions {
    pub const JOIN_QUEUE: &str = "join-queue";
    pub const CHECK_BATTLE: &str = "check-battle";
    pub const QUEUE_STATUS: &str = "queue-status";
    pub const SUBMIT_CODE: &str = "submit-code";
    pub const LEAVE_QUEUE: &str = "leave-queue";
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";
