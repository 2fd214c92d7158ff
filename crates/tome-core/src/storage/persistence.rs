//! Collection file persistence
//!
//! Handles saving and loading the book collection to/from a JSON file.
//! Uses atomic writes (write to temp file, then rename) to prevent
//! corruption.
//!
//! The on-disk format is a JSON array of book objects, indented for
//! human readability, with non-ASCII text stored unescaped.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::Book;
use crate::storage::error::{StorageError, StorageResult};

/// Persistence layer for the book collection
///
/// Provides atomic file operations for saving/loading the collection.
/// File handles are opened and released per call, never held across
/// operations.
pub struct JsonPersistence {
    config: Config,
}

impl JsonPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if a collection file exists on disk
    pub fn exists(&self) -> bool {
        self.config.books_path().exists()
    }

    /// Save the collection to disk using atomic write
    ///
    /// This writes to a temporary file first, then renames it to the
    /// target path, so the file is never left in a partially-written
    /// state.
    pub fn save(&self, books: &[Book]) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(books)?;
        let target_path = self.config.books_path();

        atomic_write(&target_path, json.as_bytes())?;

        Ok(())
    }

    /// Load the collection from disk
    ///
    /// Returns `Ok(None)` if the collection file doesn't exist; that is
    /// a normal first run, not an error. If the file exists but cannot
    /// be parsed, the damaged file is moved aside to a
    /// `.corrupt.backup` sibling and `CorruptCollection` is returned.
    pub fn load(&self) -> StorageResult<Option<Vec<Book>>> {
        let path = self.config.books_path();

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path: path.clone(),
                source: e,
            },
            _ => StorageError::ReadError {
                path: path.clone(),
                source: e,
            },
        })?;

        match serde_json::from_str::<Vec<Book>>(&content) {
            Ok(books) => Ok(Some(books)),
            Err(parse_err) => {
                let backup_path = self.backup_corrupt_file(&path)?;
                Err(StorageError::CorruptCollection {
                    path,
                    backup_path,
                    details: parse_err.to_string(),
                })
            }
        }
    }

    /// Load the existing collection or return an empty one
    ///
    /// An absent file yields an empty collection; read and parse
    /// failures still propagate.
    pub fn load_or_default(&self) -> StorageResult<Vec<Book>> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Move a corrupt collection file aside so a fresh one can be saved
    fn backup_corrupt_file(&self, path: &Path) -> StorageResult<PathBuf> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "books_data.json".to_string());
        let backup_path = path.with_file_name(format!("{}.corrupt.backup", file_name));

        fs::rename(path, &backup_path).map_err(|source| StorageError::AtomicWriteFailed {
            from: path.to_path_buf(),
            to: backup_path.clone(),
            source,
        })?;

        Ok(backup_path)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
        }
    }

    fn sample_books() -> Vec<Book> {
        vec![
            Book::new("Dune", "Frank Herbert", "1965", "SciFi", false),
            Book::new("Beloved", "Toni Morrison", "1987", "Fiction", true),
        ]
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        // Initially no collection
        assert!(!persistence.exists());
        assert!(persistence.load().unwrap().is_none());

        persistence.save(&sample_books()).unwrap();
        assert!(persistence.exists());

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, sample_books());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        let books = persistence.load_or_default().unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn test_saved_file_is_indented_json() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        persistence.save(&sample_books()).unwrap();

        let content = fs::read_to_string(persistence.config().books_path()).unwrap();
        assert!(content.starts_with('['));
        assert!(content.contains("\n  "));
        assert!(content.contains("\"title\": \"Dune\""));
    }

    #[test]
    fn test_non_ascii_text_stored_unescaped() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        let books = vec![Book::new(
            "Cien años de soledad",
            "Gabriel García Márquez",
            "1967",
            "Novela",
            true,
        )];
        persistence.save(&books).unwrap();

        let content = fs::read_to_string(persistence.config().books_path()).unwrap();
        assert!(content.contains("Cien años de soledad"));
        assert!(content.contains("García Márquez"));
        assert!(!content.contains("\\u"));

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, books);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        let path = persistence.config().books_path();
        fs::write(&path, "this is not json").unwrap();

        let err = persistence.load().unwrap_err();
        assert!(matches!(err, StorageError::CorruptCollection { .. }));

        // Damaged file moved aside, original path now free
        assert!(!path.exists());
        let backup = path.with_file_name("books_data.json.corrupt.backup");
        assert!(backup.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "this is not json");
    }

    #[test]
    fn test_save_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        persistence.save(&sample_books()).unwrap();

        let smaller = vec![Book::new("Dune", "Frank Herbert", "1965", "SciFi", true)];
        persistence.save(&smaller).unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, smaller);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("books_data.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn test_empty_collection_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        persistence.save(&[]).unwrap();
        let loaded = persistence.load().unwrap().unwrap();
        assert!(loaded.is_empty());
    }
}
