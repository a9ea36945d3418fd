//! Business logic services

pub mod auth_service;
pub mod evaluation_service;
pub mod matchmaking_service;
pub mod room_service;
pub mod sweeper;

pub use auth_service::{AuthService, Claims};
pub use evaluation_service::{EvaluationService, Submission};
pub use matchmaking_service::{JoinResult, MatchmakingService, QueueStatus};
pub use room_service::RoomService;
pub use sweeper::{SweepStats, Sweeper};
