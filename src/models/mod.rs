//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod challenge;
pub mod evaluation;
pub mod participant;
pub mod queue;
pub mod room;

pub use challenge::*;
pub use evaluation::*;
pub use participant::*;
pub use queue::*;
pub use room::*;
