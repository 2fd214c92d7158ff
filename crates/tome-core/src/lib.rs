//! tome core library
//!
//! Core functionality for tome, a personal book collection tracker.
//! The collection lives in memory and is mirrored to a JSON file after
//! every mutation.
//!
//! # Quick Start
//!
//! ```text
//! let (mut store, _outcome) = Store::open_with_config(config);
//!
//! store.add(Book::new("Dune", "Frank Herbert", "1965", "SciFi", false))?;
//!
//! let matches = store.find("dune");
//! ```
//!
//! # Modules
//!
//! - `store`: In-memory collection plus persistence (main entry point)
//! - `models`: The book record and update patch
//! - `storage`: JSON file persistence and typed storage errors
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{Book, BookPatch};
pub use storage::{JsonPersistence, StorageError, StorageResult};
pub use store::{LoadOutcome, ReadingStats, Store};
