//! Persistent session token storage
//!
//! Tokens live under fixed keys (`nc_jwt_access`, `nc_jwt_refresh`,
//! `nc_jwt_username`). The file backend keeps them in a small JSON document
//! that is replaced atomically on every write.

use nccms_core::{Session, SessionConfig, StoreBackend, TokenKind};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key/value storage for the session tokens
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Value stored for `kind`, if any
    fn get(&self, kind: TokenKind) -> Option<String>;

    /// Store `value` under `kind`
    fn set(&self, kind: TokenKind, value: &str) -> nccms_core::Result<()>;

    /// Remove the value stored under `kind`
    fn remove(&self, kind: TokenKind) -> nccms_core::Result<()>;

    /// Drop both credentials, keeping the remembered username
    fn clear_tokens(&self) -> nccms_core::Result<()> {
        self.remove(TokenKind::Access)?;
        self.remove(TokenKind::Refresh)
    }

    /// Drop everything, including the remembered username
    fn clear(&self) -> nccms_core::Result<()> {
        for kind in TokenKind::ALL {
            self.remove(kind)?;
        }
        Ok(())
    }

    /// Snapshot of all stored values
    fn session(&self) -> Session {
        Session {
            access_token: self.get(TokenKind::Access),
            refresh_token: self.get(TokenKind::Refresh),
            remembered_username: self.get(TokenKind::RememberedUsername),
        }
    }
}

/// In-process store; the session ends with the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from `session`
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let mut values = HashMap::new();
        for kind in TokenKind::ALL {
            if let Some(value) = session.get(kind) {
                values.insert(kind, value.to_string());
            }
        }
        Self {
            values: RwLock::new(values),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.values.read().get(&kind).cloned()
    }

    fn set(&self, kind: TokenKind, value: &str) -> nccms_core::Result<()> {
        self.values.write().insert(kind, value.to_string());
        Ok(())
    }

    fn remove(&self, kind: TokenKind) -> nccms_core::Result<()> {
        self.values.write().remove(&kind);
        Ok(())
    }
}

/// JSON-file store surviving process restarts
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

type Document = BTreeMap<String, String>;

impl FileTokenStore {
    /// Store backed by the file at `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the session file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> nccms_core::Result<Document> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            nccms_core::Error::store(format!(
                "session file {} is corrupt: {e}",
                self.path.display()
            ))
        })
    }

    fn write_document(&self, document: &Document) -> nccms_core::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        restrict_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), keys = document.len(), "Session file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Document)) -> nccms_core::Result<()> {
        let _guard = self.lock.lock();
        let mut document = self.read_document()?;
        apply(&mut document);
        self.write_document(&document)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> nccms_core::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_path: &Path) -> nccms_core::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let _guard = self.lock.lock();
        match self.read_document() {
            Ok(mut document) => document.remove(kind.storage_key()),
            Err(e) => {
                warn!(error = %e, "Session file unreadable, treating as empty");
                None
            }
        }
    }

    fn set(&self, kind: TokenKind, value: &str) -> nccms_core::Result<()> {
        self.update(|document| {
            document.insert(kind.storage_key().to_string(), value.to_string());
        })
    }

    fn remove(&self, kind: TokenKind) -> nccms_core::Result<()> {
        self.update(|document| {
            document.remove(kind.storage_key());
        })
    }
}

/// Open the store selected by the session configuration
#[must_use]
pub fn open_store(config: &SessionConfig) -> Arc<dyn TokenStore> {
    match config.store {
        StoreBackend::Memory => Arc::new(MemoryTokenStore::new()),
        StoreBackend::File => Arc::new(FileTokenStore::new(config.resolved_path())),
    }
}
