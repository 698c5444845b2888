//! HTTP handlers

pub mod category;
pub mod health;
pub mod inventory;
pub mod product;
pub mod reporting;
pub mod supplier;

pub use category::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use reporting::*;
pub use supplier::*;
