//! Unified collection interface
//!
//! The `Store` owns the in-memory book list and coordinates it with the
//! JSON file on disk: every mutating operation saves immediately, so
//! memory and disk stay consistent between operations.
//!
//! Lookup misses ("no book with that title") are ordinary outcomes
//! reported as `Ok(None)`, not errors. Storage failures surface as
//! `StorageError`; the in-memory mutation has already happened by then,
//! so callers can keep the session going with memory ahead of disk.
//!
//! The store assumes single-threaded, single-process exclusive access
//! to its collection file for the duration of the session.

use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Book, BookPatch};
use crate::storage::{JsonPersistence, StorageError, StorageResult};

/// In-memory book collection backed by a JSON file
pub struct Store {
    books: Vec<Book>,
    persistence: JsonPersistence,
}

/// How the collection came up at startup
///
/// Every variant leaves the store usable; `Recovered` means the session
/// starts empty because the existing file could not be read.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Existing collection loaded, with its record count
    Loaded(usize),
    /// No collection file yet, starting empty
    Fresh,
    /// Collection file unreadable or corrupt, starting empty
    Recovered(StorageError),
}

impl Store {
    /// Open the store with the given configuration
    ///
    /// Never fails: an absent collection file yields an empty
    /// collection, and an unreadable or corrupt one yields an empty
    /// collection plus a `Recovered` outcome for the caller to report.
    pub fn open_with_config(config: Config) -> (Self, LoadOutcome) {
        let persistence = JsonPersistence::new(config);

        let (books, outcome) = match persistence.load() {
            Ok(Some(books)) => {
                let count = books.len();
                (books, LoadOutcome::Loaded(count))
            }
            Ok(None) => (Vec::new(), LoadOutcome::Fresh),
            Err(err) => {
                warn!("failed to load collection, starting empty: {err}");
                (Vec::new(), LoadOutcome::Recovered(err))
            }
        };

        (Self { books, persistence }, outcome)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.persistence.config()
    }

    /// Number of books in the collection
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Add a book to the end of the collection and save
    ///
    /// All field values are accepted as-is; empty strings and
    /// non-numeric years are fine. The record is in memory even if the
    /// save fails.
    pub fn add(&mut self, book: Book) -> StorageResult<()> {
        self.books.push(book);
        self.save()
    }

    /// Remove the first book whose title matches, ignoring case
    ///
    /// Returns the removed record, or `Ok(None)` when nothing matches
    /// (state untouched, nothing saved). A save is only attempted after
    /// a match, so an `Err` means the record was removed in memory.
    pub fn remove(&mut self, title: &str) -> StorageResult<Option<Book>> {
        let Some(index) = self.find_index(title) else {
            return Ok(None);
        };

        let removed = self.books.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    /// Get the first book whose title matches, ignoring case
    pub fn get(&self, title: &str) -> Option<&Book> {
        self.find_index(title).map(|i| &self.books[i])
    }

    /// Search by case-insensitive substring match on title or author
    ///
    /// Results preserve collection order. An empty result set is a
    /// valid outcome.
    pub fn find(&self, query: &str) -> Vec<Book> {
        let query = query.to_lowercase();
        self.books
            .iter()
            .filter(|book| book.matches_query(&query))
            .cloned()
            .collect()
    }

    /// Patch the first book whose title matches, ignoring case
    ///
    /// Returns the updated record, or `Ok(None)` when nothing matches.
    /// As with `remove`, an `Err` means the in-memory update succeeded
    /// but the save did not.
    pub fn update(&mut self, title: &str, patch: &BookPatch) -> StorageResult<Option<Book>> {
        let Some(index) = self.find_index(title) else {
            return Ok(None);
        };

        patch.apply(&mut self.books[index]);
        let updated = self.books[index].clone();
        self.save()?;
        Ok(Some(updated))
    }

    /// The full collection, in insertion order
    pub fn all(&self) -> &[Book] {
        &self.books
    }

    /// Reading progress over the whole collection
    pub fn stats(&self) -> ReadingStats {
        ReadingStats {
            total: self.books.len(),
            read_count: self.books.iter().filter(|b| b.read).count(),
        }
    }

    /// Save the collection to disk
    pub fn save(&self) -> StorageResult<()> {
        self.persistence.save(&self.books)?;
        debug!(books = self.books.len(), "collection saved");
        Ok(())
    }

    /// Index of the first book whose title matches, ignoring case
    fn find_index(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|b| b.title_matches(title))
    }
}

/// Completion statistics for the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingStats {
    /// Total books in the collection
    pub total: usize,
    /// Books marked as read
    pub read_count: usize,
}

impl ReadingStats {
    /// Completion percentage, 0.0 for an empty collection
    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.read_count as f64 / self.total as f64 * 100.0
        }
    }
}
