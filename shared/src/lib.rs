//! Shared types, models and accounting rules for the inventory ledger
//!
//! This crate holds everything that does not need a database: domain models
//! and API payloads, input validation, operational-day date handling and the
//! weighted-average position math used by the inventory engine.

pub mod accounting;
pub mod dates;
pub mod models;
pub mod types;
pub mod validation;

pub use accounting::*;
pub use dates::*;
pub use models::*;
pub use types::*;
pub use validation::*;
