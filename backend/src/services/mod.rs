//! Business logic services for the inventory ledger

pub mod category;
pub mod inventory;
pub mod product;
pub mod reporting;
pub mod supplier;

pub use category::CategoryService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use supplier::SupplierService;
