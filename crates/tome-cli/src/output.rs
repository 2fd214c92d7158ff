//! Output formatting for the session
//!
//! Book list rendering and reading-progress rendering, kept separate
//! from the prompt flow so the formats are testable on their own.

use std::io::{self, Write};

use tome_core::{Book, ReadingStats};

/// Format one book as a numbered list line
pub fn book_line(index: usize, book: &Book) -> String {
    let status = if book.read { "Read" } else { "Unread" };
    format!(
        "{}. {} by {} ({}) - {} - {}",
        index, book.title, book.author, book.year, book.genre, status
    )
}

/// Write a 1-based numbered list of books
pub fn write_book_list<W: Write>(out: &mut W, books: &[Book]) -> io::Result<()> {
    for (index, book) in books.iter().enumerate() {
        writeln!(out, "{}", book_line(index + 1, book))?;
    }
    Ok(())
}

/// Write reading-progress statistics, percentage to two decimals
pub fn write_stats<W: Write>(out: &mut W, stats: &ReadingStats) -> io::Result<()> {
    writeln!(out, "Total books in collection: {}", stats.total)?;
    writeln!(out, "Books read: {}", stats.read_count)?;
    writeln!(out, "Reading progress: {:.2}%", stats.completion_percent())?;
    Ok(())
}
