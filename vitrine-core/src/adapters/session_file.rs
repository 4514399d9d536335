//! File-backed session store
//!
//! Persists the session token as `session.json` in the Vitrine directory so
//! that it survives between CLI invocations:
//! ```json
//! { "token": "eyJhbGciOi..." }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::SessionToken;
use crate::ports::SessionStore;

const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "session.lock";

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: SessionToken,
}

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileSessionStore {
    pub fn new(vitrine_dir: &Path) -> Self {
        Self {
            path: vitrine_dir.join(SESSION_FILE),
            lock_path: vitrine_dir.join(LOCK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the lock file; the lock is released when the handle drops
    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| Error::storage(format!("Failed to open session lock: {}", e)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock)
            .map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;

        // May have been cleared while waiting for the lock
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let file: SessionFile = serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("Corrupt session file {}: {}", self.path.display(), e))
        })?;

        if file.token.as_str().is_empty() {
            return Ok(None);
        }
        Ok(Some(file.token))
    }

    fn save(&self, token: &SessionToken) -> Result<()> {
        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)
            .map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;

        let content = serde_json::to_string_pretty(&SessionFile {
            token: token.clone(),
        })?;

        // Write to a sibling temp file, then rename over the old one
        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut options = OpenOptions::new();
            options.create(true).write(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut temp = options.open(&temp_path)?;
            temp.write_all(content.as_bytes())?;
            temp.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::storage(format!("Failed to write session file: {}", e)))?;

        tracing::debug!(path = %self.path.display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)
            .map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session token cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Failed to remove session file: {}", e))),
        }
    }
}
