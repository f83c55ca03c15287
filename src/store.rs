use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::models::auth::StoredSession;

/// File-backed persistence for the session triple. The triple is always
/// written and removed as a unit; a missing or unreadable file reads as
/// "no session". No expiry is recorded — a stored token is considered
/// valid until the service rejects it.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrite the stored triple. Write-then-rename so a crash
    /// mid-save never leaves a torn file behind.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn load(&self) -> Option<StoredSession> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "discarding corrupt session file: {e}"
                );
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.load().map(|s| s.token)
    }

    pub fn username(&self) -> Option<String> {
        self.load().map(|s| s.username)
    }

    pub fn role(&self) -> Option<String> {
        self.load().map(|s| s.role)
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
