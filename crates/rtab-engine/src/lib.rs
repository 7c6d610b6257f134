//! RTAB Engine Library
//!
//! Ingests records from a paginated remote record store, flattens nested
//! record structures (including one-to-many sub-tables) into flat tables,
//! and publishes a queryable catalog of named tables, with each sub-table
//! pre-joined against its parent table.
//!
//! # Pipeline
//!
//! For every configured data-source, in configuration order:
//!
//! 1. **Fetch** all records by walking offset pagination ([`client`])
//! 2. **Flatten** each record into a parent row and sub-table rows ([`flatten`])
//! 3. **Assemble** the main table and sub-tables, then **publish** them under
//!    derived names ([`catalog`])
//!
//! # Example
//!
//! ```no_run
//! use rtab_engine::DataManager;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut manager = DataManager::from_file(Path::new("rtab.json"), "production")?;
//!     manager.fetch_cycle().await?;
//!
//!     for name in manager.table_names()? {
//!         println!("{}", name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod flatten;
pub mod record;

// Re-export commonly used types
pub use catalog::{Catalog, DataManager};
pub use config::Settings;
pub use error::{EngineError, Result};
