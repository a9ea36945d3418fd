//! Utility functions

pub mod ids;
pub mod time;
pub mod validation;

pub use ids::generate_battle_id;
pub use time::{elapsed_ms, now_utc};
pub use validation::{validate_language, validate_source_code};
