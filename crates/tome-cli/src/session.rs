//! Interactive menu session
//!
//! One state with a self-loop: render the menu, read a choice, dispatch
//! to the store, print the outcome. No failure inside a single menu
//! selection terminates the loop; errors are reported and the menu
//! comes back.
//!
//! The session is generic over its input and output streams so tests
//! can drive the full menu with scripted input.

use std::io::{self, BufRead, Write};

use tome_core::{Book, BookPatch, LoadOutcome, StorageError, Store};

use crate::output;

const MENU_WIDTH: usize = 50;

/// What the loop should do after a menu selection
enum MenuAction {
    Continue,
    Quit,
}

/// Interactive session over a store
pub struct Session<R, W> {
    store: Store,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(store: Store, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Report how the collection came up at startup
    ///
    /// The count line is printed on every path, including a fresh or
    /// recovered (empty) start.
    pub fn report_load(&mut self, outcome: &LoadOutcome) -> io::Result<()> {
        match outcome {
            LoadOutcome::Loaded(_) => {
                writeln!(self.output, "Books loaded successfully")?;
            }
            LoadOutcome::Fresh => {
                writeln!(
                    self.output,
                    "No existing data file found, starting with empty collection"
                )?;
            }
            LoadOutcome::Recovered(err) => {
                writeln!(self.output, "Error loading books: {}", err)?;
                if let Some(suggestion) = err.recovery_suggestion() {
                    writeln!(self.output, "{}", suggestion)?;
                }
            }
        }
        writeln!(self.output, "Loaded books: {}", self.store.len())
    }

    /// Run the menu loop until the user exits
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.render_menu()?;

            let Some(line) = self.read_line()? else {
                // Input stream closed; leave the same way an explicit
                // exit would, with a final save.
                self.exit_session()?;
                return Ok(());
            };

            let choice = line.trim().to_string();
            let action = match self.dispatch(&choice) {
                Ok(action) => action,
                Err(err) => {
                    writeln!(
                        self.output,
                        "\nAn error occurred: {}. Please try again.",
                        err
                    )?;
                    MenuAction::Continue
                }
            };

            if matches!(action, MenuAction::Quit) {
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, choice: &str) -> anyhow::Result<MenuAction> {
        match choice {
            "1" => self.add_book()?,
            "2" => self.remove_book()?,
            "3" => self.search_books()?,
            "4" => self.update_book()?,
            "5" => self.list_books()?,
            "6" => self.show_stats()?,
            "7" => {
                self.exit_session()?;
                return Ok(MenuAction::Quit);
            }
            _ => {
                writeln!(
                    self.output,
                    "\nInvalid choice. Please enter a number between 1-7."
                )?;
            }
        }
        Ok(MenuAction::Continue)
    }

    fn render_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(MENU_WIDTH);
        writeln!(self.output)?;
        writeln!(self.output, "{}", rule)?;
        writeln!(
            self.output,
            "{:^width$}",
            "Welcome to Your Book Collection Manager!",
            width = MENU_WIDTH
        )?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "1. Add a new book")?;
        writeln!(self.output, "2. Remove a book")?;
        writeln!(self.output, "3. Search for books")?;
        writeln!(self.output, "4. Update book details")?;
        writeln!(self.output, "5. View all books")?;
        writeln!(self.output, "6. View reading progress")?;
        writeln!(self.output, "7. Exit")?;
        writeln!(self.output)?;
        write!(self.output, "Please choose an option (1-7): ")?;
        self.output.flush()
    }

    /// Read one line, `None` when the input stream is closed
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Prompt for one line of input, returned as entered
    ///
    /// Field values keep interior and leading whitespace; only the line
    /// terminator is stripped. A closed input stream reads as blank.
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Prompt for a yes/no answer; anything but "yes" means no
    fn prompt_yes_no(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.prompt(label)?;
        Ok(answer.trim().to_lowercase() == "yes")
    }

    fn add_book(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\nAdd new book:")?;
        let title = self.prompt("Title: ")?;
        let author = self.prompt("Author: ")?;
        let year = self.prompt("Publication year: ")?;
        let genre = self.prompt("Genre: ")?;
        let read = self.prompt_yes_no("Have you read this book? (yes/no): ")?;

        let book = Book::new(title.clone(), author, year, genre, read);
        match self.store.add(book) {
            Ok(()) => {
                writeln!(
                    self.output,
                    "Book '{}' has been added to your collection.",
                    title
                )?;
            }
            Err(err) => {
                self.report_save_failure("The book was added in memory, but saving failed", &err)?;
            }
        }
        Ok(())
    }

    fn remove_book(&mut self) -> anyhow::Result<()> {
        let title = self.prompt("Enter title of book to remove: ")?;
        match self.store.remove(&title) {
            Ok(Some(_)) => writeln!(self.output, "Book removed successfully!")?,
            Ok(None) => writeln!(self.output, "Book not found!")?,
            Err(err) => {
                self.report_save_failure(
                    "The book was removed in memory, but saving failed",
                    &err,
                )?;
            }
        }
        Ok(())
    }

    fn search_books(&mut self) -> anyhow::Result<()> {
        let query = self.prompt("Enter search term: ")?;
        let matches = self.store.find(&query);

        if matches.is_empty() {
            writeln!(self.output, "\nNo matching books found.")?;
        } else {
            writeln!(self.output, "\nMatching books:")?;
            output::write_book_list(&mut self.output, &matches)?;
        }
        Ok(())
    }

    fn update_book(&mut self) -> anyhow::Result<()> {
        let title = self.prompt("Enter title of book to update: ")?;

        let Some(current) = self.store.get(&title).cloned() else {
            writeln!(self.output, "\nBook not found!")?;
            return Ok(());
        };

        writeln!(self.output, "\nLeave blank to keep existing value.")?;
        let new_title = self.prompt(&format!("New title ({}): ", current.title))?;
        let new_author = self.prompt(&format!("New author ({}): ", current.author))?;
        let new_year = self.prompt(&format!("New year ({}): ", current.year))?;
        let new_genre = self.prompt(&format!("New genre ({}): ", current.genre))?;
        // Read status is always recomputed from this answer; a blank
        // here means unread, not "keep existing".
        let read = self.prompt_yes_no("Have you read this book? (yes/no): ")?;

        let patch = BookPatch {
            title: non_empty(new_title),
            author: non_empty(new_author),
            year: non_empty(new_year),
            genre: non_empty(new_genre),
            read,
        };

        match self.store.update(&title, &patch) {
            Ok(Some(_)) => writeln!(self.output, "\nBook updated successfully!")?,
            Ok(None) => writeln!(self.output, "\nBook not found!")?,
            Err(err) => {
                self.report_save_failure(
                    "The book was updated in memory, but saving failed",
                    &err,
                )?;
            }
        }
        Ok(())
    }

    fn list_books(&mut self) -> anyhow::Result<()> {
        if self.store.is_empty() {
            writeln!(self.output, "\nYour collection is empty.")?;
            return Ok(());
        }

        writeln!(self.output, "\nYour Book Collection:")?;
        output::write_book_list(&mut self.output, self.store.all())?;
        Ok(())
    }

    fn show_stats(&mut self) -> anyhow::Result<()> {
        let stats = self.store.stats();
        writeln!(self.output)?;
        output::write_stats(&mut self.output, &stats)?;
        Ok(())
    }

    fn exit_session(&mut self) -> anyhow::Result<()> {
        match self.store.save() {
            Ok(()) => writeln!(self.output, "Books saved successfully")?,
            Err(err) => self.report_save_failure("Saving failed on exit", &err)?,
        }
        writeln!(
            self.output,
            "\nThank you for using Book Collection Manager. Goodbye!"
        )?;
        Ok(())
    }

    /// Report a save failure without ending the session
    ///
    /// The on-disk collection may now lag the in-memory one; the next
    /// successful save catches it up.
    fn report_save_failure(&mut self, context: &str, err: &StorageError) -> io::Result<()> {
        writeln!(self.output, "{}: {}", context, err)?;
        if let Some(suggestion) = err.recovery_suggestion() {
            writeln!(self.output, "{}", suggestion)?;
        }
        Ok(())
    }
}

/// Blank input means "keep the existing value"
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use tome_core::Config;

    fn run_session(input: &str, temp_dir: &TempDir) -> String {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
        };
        let (store, outcome) = Store::open_with_config(config);

        let mut out = Vec::new();
        let mut session = Session::new(store, Cursor::new(input.as_bytes()), &mut out);
        session.report_load(&outcome).unwrap();
        session.run().unwrap();

        String::from_utf8(out).unwrap()
    }

    const ADD_DUNE_UNREAD: &str = "1\nDune\nFrank Herbert\n1965\nSciFi\nno\n";

    #[test]
    fn test_empty_list_and_exit() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("5\n7\n", &temp_dir);

        assert!(out.contains("No existing data file found"));
        assert!(out.contains("Loaded books: 0"));
        assert!(out.contains("Your collection is empty."));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_add_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("1\nDune\nFrank Herbert\n1965\nSciFi\nyes\n5\n7\n", &temp_dir);

        assert!(out.contains("Book 'Dune' has been added to your collection."));
        assert!(out.contains("Your Book Collection:"));
        assert!(out.contains("1. Dune by Frank Herbert (1965) - SciFi - Read"));
    }

    #[test]
    fn test_search_lowercase_query_matches_mixed_case_title() {
        let temp_dir = TempDir::new().unwrap();
        let input = format!("{}3\ndune\n7\n", ADD_DUNE_UNREAD);
        let out = run_session(&input, &temp_dir);

        assert!(out.contains("Matching books:"));
        assert!(out.contains("1. Dune by Frank Herbert (1965) - SciFi - Unread"));
    }

    #[test]
    fn test_search_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("3\nasimov\n7\n", &temp_dir);

        assert!(out.contains("No matching books found."));
    }

    #[test]
    fn test_remove_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("2\nNo Such Book\n7\n", &temp_dir);

        assert!(out.contains("Book not found!"));
    }

    #[test]
    fn test_remove_found() {
        let temp_dir = TempDir::new().unwrap();
        let input = format!("{}2\nDUNE\n5\n7\n", ADD_DUNE_UNREAD);
        let out = run_session(&input, &temp_dir);

        assert!(out.contains("Book removed successfully!"));
        assert!(out.contains("Your collection is empty."));
    }

    #[test]
    fn test_update_blank_keeps_fields_and_yes_marks_read() {
        let temp_dir = TempDir::new().unwrap();
        // Update with every field blank and a "yes" read answer
        let input = format!("{}4\ndune\n\n\n\n\nyes\n5\n7\n", ADD_DUNE_UNREAD);
        let out = run_session(&input, &temp_dir);

        assert!(out.contains("Leave blank to keep existing value."));
        assert!(out.contains("New title (Dune): "));
        assert!(out.contains("Book updated successfully!"));
        assert!(out.contains("1. Dune by Frank Herbert (1965) - SciFi - Read"));
    }

    #[test]
    fn test_update_not_found_skips_field_prompts() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("4\nmissing\n7\n", &temp_dir);

        assert!(out.contains("Book not found!"));
        assert!(!out.contains("Leave blank"));
    }

    #[test]
    fn test_stats_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("6\n7\n", &temp_dir);

        assert!(out.contains("Total books in collection: 0"));
        assert!(out.contains("Books read: 0"));
        assert!(out.contains("Reading progress: 0.00%"));
    }

    #[test]
    fn test_invalid_choice_keeps_looping() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("9\n7\n", &temp_dir);

        assert!(out.contains("Invalid choice. Please enter a number between 1-7."));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_collection_survives_restart() {
        let temp_dir = TempDir::new().unwrap();

        let first = run_session(&format!("{}7\n", ADD_DUNE_UNREAD), &temp_dir);
        assert!(first.contains("has been added"));

        let second = run_session("5\n7\n", &temp_dir);
        assert!(second.contains("Loaded books: 1"));
        assert!(second.contains("1. Dune by Frank Herbert (1965) - SciFi - Unread"));
    }

    #[test]
    fn test_closed_input_saves_and_exits() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_session("", &temp_dir);

        assert!(out.contains("Books saved successfully"));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_save_failure_reported_and_session_continues() {
        let temp_dir = TempDir::new().unwrap();
        // A directory at the atomic-write temp path makes every save fail
        std::fs::create_dir(temp_dir.path().join("books_data.tmp")).unwrap();

        let input = format!("{}5\n7\n", ADD_DUNE_UNREAD);
        let out = run_session(&input, &temp_dir);

        assert!(out.contains("The book was added in memory, but saving failed"));
        // The record is still served from memory and the loop keeps going
        assert!(out.contains("1. Dune by Frank Herbert (1965) - SciFi - Unread"));
        assert!(out.contains("Saving failed on exit"));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_corrupt_file_reported_and_session_continues() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("books_data.json"), "{ bad json").unwrap();

        let out = run_session("5\n7\n", &temp_dir);
        assert!(out.contains("Error loading books:"));
        assert!(out.contains("Your collection is empty."));
        assert!(out.contains("Goodbye!"));
    }
}
