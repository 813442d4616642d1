//! Session token port.
//!
//! The token is the only cross-component mutable resource. Request
//! construction gets a read-only `TokenSource`; only the session controller
//! holds a `TokenStore`. Neither implementation caches: every `load` reads the
//! current stored value.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::TokenError;

/// Read access to the persisted session token.
pub trait TokenSource: Send + Sync {
    fn load(&self) -> Option<String>;
}

/// Read/write access to the persisted session token.
pub trait TokenStore: TokenSource {
    fn save(&self, token: &str) -> Result<(), TokenError>;
    fn clear(&self) -> Result<(), TokenError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenSource for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), TokenError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Token persisted to a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSource for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
