//! Data models for tome
//!
//! Defines the core data structures: the book record and the patch
//! shape used by update operations.

use serde::{Deserialize, Serialize};

/// One book in the collection
///
/// All text fields are stored as entered. `year` is deliberately a
/// free-form string: the collection accepts "1965", "c. 1965" or an
/// empty string alike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Display title, also the match key for remove/update
    pub title: String,
    /// Author name
    pub author: String,
    /// Publication year, free-form
    pub year: String,
    /// Genre label
    pub genre: String,
    /// Whether the book has been read
    pub read: bool,
}

impl Book {
    /// Create a new book record
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        genre: impl Into<String>,
        read: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            genre: genre.into(),
            read,
        }
    }

    /// Check whether this book's title equals `title`, ignoring case
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }

    /// Check whether title or author contains `query`, ignoring case
    ///
    /// `query` must already be lowercased by the caller.
    pub(crate) fn matches_query(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query) || self.author.to_lowercase().contains(query)
    }
}

/// Field replacements for an update operation
///
/// `None` keeps the existing value. `read` is always applied: the
/// update flow recomputes read status from the yes/no answer rather
/// than keeping the old value on a blank response.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub read: bool,
}

impl BookPatch {
    /// Apply this patch to a book in place
    pub fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(year) = &self.year {
            book.year = year.clone();
        }
        if let Some(genre) = &self.genre {
            book.genre = genre.clone();
        }
        book.read = self.read;
    }
}
