//! RTAB Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared foundation for the RTAB workspace members:
//!
//! - **Types**: the flat-row / table model the engine publishes
//! - **Logging**: centralized tracing setup for binaries and tests
//!
//! # Example
//!
//! ```no_run
//! use rtab_common::{FlatRow, Table};
//! use serde_json::json;
//!
//! let mut row = FlatRow::new();
//! row.insert("name".to_string(), json!("widget"));
//! let table = Table::from_rows(vec![row]);
//! assert_eq!(table.height(), 1);
//! ```

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{FlatRow, Table};
