//! CodeDuel - head-to-head coding battles
//!
//! This library provides the matchmaking queue and battle-room lifecycle
//! behind a competitive coding platform: two players are paired in FIFO
//! order, handed the same randomly chosen challenge, and the first to pass
//! every test case wins.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Matchmaking, room lifecycle, evaluation and sweeping
//! - **Stores**: Queue and room state, in memory or in Redis
//! - **Runner**: Sandboxed or simulated execution of submissions
//! - **Models**: Domain models and DTOs

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod runner;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
