// EmployeeStore - Employee records in SQLite with CSV export

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use error::{ErrorKind, StoreError, StoreResult};
pub use export::QuoteStyle;
pub use models::Employee;
pub use store::{ExportReport, SchemaPolicy, Store, StoreOptions};

// Re-export rusqlite for callers that inspect the database directly
pub use rusqlite;
