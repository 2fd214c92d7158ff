//! Storage layer
//!
//! Handles persistence of the book collection as a single JSON file,
//! plus the typed errors storage operations can produce.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::JsonPersistence;
