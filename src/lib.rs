//! Sparkify ETL Library
//!
//! Loads song metadata and user activity logs, stored as line-delimited JSON,
//! into a songplay star schema.

pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod sqlite_persistence;
pub mod transform;
pub mod warehouse;

pub use error::{DiscoverError, ExtractError, LookupError, StoreError, WriteError};
pub use pipeline::{process_data, run, Category, CategoryReport, FileReport, RunReport};
pub use warehouse::{Warehouse, WarehouseWriter};
