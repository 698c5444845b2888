//! Domain models for the inventory ledger

mod category;
mod inventory;
mod product;
mod supplier;

pub use category::*;
pub use inventory::*;
pub use product::*;
pub use supplier::*;
