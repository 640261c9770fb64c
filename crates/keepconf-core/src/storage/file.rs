//! File-backed storage.
//!
//! Reads and writes a single file at a caller-given path.  A file that does
//! not exist is reported as missing, never as an error.
//!
//! Saves go through a sibling temp file that is flushed and then renamed over
//! the target, so a crash or a failed write leaves the previous content in
//! place instead of a truncated file.  When the path is a symlink the rename
//! lands on the file it points to, leaving the link in place.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::{Storage, StorageError};

/// Permission bits applied to newly written files (owner/group read-write).
pub const DEFAULT_FILE_MODE: u32 = 0o664;

/// Symlink chains longer than this are written at the last link reached.
const MAX_LINK_DEPTH: usize = 40;

/// Stores config bytes in a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStorage {
    path: PathBuf,
    mode: u32,
}

impl FileStorage {
    /// Creates a storage for `path` using [`DEFAULT_FILE_MODE`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: DEFAULT_FILE_MODE,
        }
    }

    /// Overrides the permission bits used when writing.  Ignored on
    /// non-unix platforms.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Permission bits used when writing.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Follows symlinks from the configured path to the file that actually
    /// holds the data, so a save replaces the target and keeps the link.
    /// A dangling link resolves to the path it points at.
    fn resolve_target(&self) -> PathBuf {
        let mut target = self.path.clone();
        for _ in 0..MAX_LINK_DEPTH {
            let Ok(link) = fs::read_link(&target) else {
                break;
            };
            target = match target.parent() {
                Some(dir) => dir.join(link),
                None => link,
            };
        }
        target
    }

    fn temp_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        target.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    fn write_temp(&self, temp: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }

        let mut file = options.open(temp)?;
        file.write_all(data)?;
        file.sync_all()
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "config file not found");
                Ok(None)
            }
            Err(e) => Err(Self::io_error(&self.path, e)),
        }
    }

    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve_target();

        // Ensure directory exists before writing.
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|source| Self::io_error(dir, source))?;
        }

        let temp = Self::temp_path(&target);
        if let Err(source) = self.write_temp(&temp, data) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&temp, source));
        }

        if let Err(source) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(&target, source));
        }

        debug!(path = %target.display(), bytes = data.len(), "config file written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
