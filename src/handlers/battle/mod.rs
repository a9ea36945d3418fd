//! Battle handlers
//!
//! One endpoint, dispatched on the `action` parameter.

mod handler;
pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Battle routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/battle",
        get(handler::battle_query).post(handler::battle_action),
    )
}
