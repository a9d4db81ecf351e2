//! File-backed snapshot store.
//!
//! One JSON file per key in a single directory. Writes go to a temp file
//! first and are renamed into place, so a crash mid-write leaves the previous
//! snapshot intact.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vigil_gameplay::{SaveError, SaveResult, SnapshotStore};

/// Extension for stored documents.
const DOCUMENT_EXT: &str = "json";

/// Extension for in-flight writes.
const TEMP_EXT: &str = "tmp";

/// Snapshot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file a key is stored in.
    #[must_use]
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{DOCUMENT_EXT}"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{TEMP_EXT}"))
    }

    fn validate_key(key: &str) -> SaveResult<()> {
        if key.is_empty() {
            return Err(SaveError::Unavailable("Empty key".to_string()));
        }

        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        if let Some(c) = key.chars().find(|c| invalid_chars.contains(c)) {
            return Err(SaveError::Unavailable(format!("Invalid character '{c}' in key")));
        }

        Ok(())
    }

    fn ensure_dir(&self) -> SaveResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            info!("Created snapshot directory: {}", self.dir.display());
        }
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&mut self, key: &str) -> SaveResult<Option<String>> {
        Self::validate_key(key)?;
        match fs::read_to_string(self.document_path(key)) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, document: &str) -> SaveResult<()> {
        Self::validate_key(key)?;
        self.ensure_dir()?;

        let temp_path = self.temp_path(key);
        let final_path = self.document_path(key);

        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(document.as_bytes())?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            SaveError::Io(e)
        })?;

        debug!("Wrote snapshot to {}", final_path.display());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> SaveResult<()> {
        Self::validate_key(key)?;
        match fs::remove_file(self.document_path(key)) {
            Ok(()) => {
                info!("Deleted snapshot: {}", key);
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
