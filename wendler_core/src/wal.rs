//! Session history log.
//!
//! Sessions are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::state::{lock_for_update, write_atomic};
use crate::store::SessionStore;
use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSONL-based session store with file locking
pub struct JsonlSessionStore {
    path: PathBuf,
}

impl JsonlSessionStore {
    /// Create a new JSONL store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for JsonlSessionStore {
    fn insert_session(&mut self, session: &WorkoutSession) -> Result<()> {
        self.ensure_parent_dir()?;
        let _lock = lock_for_update(&self.path)?;

        // Open after locking so a concurrent rewrite can't leave us on a stale inode
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write session as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended session {} to log", session.id);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<WorkoutSession>> {
        let mut sessions = read_sessions(&self.path)?;
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    fn delete_session(&mut self, id: Uuid) -> Result<bool> {
        self.ensure_parent_dir()?;
        let _lock = lock_for_update(&self.path)?;

        let mut sessions = read_sessions(&self.path)?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            tracing::debug!("Session {} not found", id);
            return Ok(false);
        }

        // Rewrite the log without the deleted session, oldest first
        let mut contents = String::new();
        for session in &sessions {
            contents.push_str(&serde_json::to_string(session)?);
            contents.push('\n');
        }
        write_atomic(&self.path, contents.as_bytes())?;

        tracing::info!("Deleted session {}", id);
        Ok(true)
    }
}

/// Read all sessions from a log file, in file order
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from log", sessions.len());
    Ok(sessions)
}
