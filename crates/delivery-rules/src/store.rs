//! Persistence boundary for configurations.
//!
//! A store keeps one opaque JSON blob per owner key and replaces it wholesale on
//! save (last writer wins). This crate ships an in-memory store and a
//! directory-backed file store; anything remote implements [`ConfigurationStore`].

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::editor::EditorSession;

/// Namespace the configuration is stored under in the host platform.
pub const CONFIG_NAMESPACE: &str = "delivery_settings";

/// Key of the configuration within [`CONFIG_NAMESPACE`].
pub const CONFIG_KEY: &str = "config";

/// Failures reaching or writing the backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error for owner {owner:?}: {source}")]
    Io {
        owner: String,
        #[source]
        source: io::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected for owner {owner:?}: {message}")]
    Rejected { owner: String, message: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] crate::error::RulesError),
}

/// Owner-keyed blob storage.
pub trait ConfigurationStore {
    /// Fetch the stored blob, or `None` if the owner has never saved one.
    fn load(&self, owner: &str) -> Result<Option<String>, StoreError>;

    /// Replace the owner's blob.
    fn save(&self, owner: &str, blob: &str) -> Result<(), StoreError>;
}

/// Load an owner's configuration.
///
/// A missing or malformed blob yields the empty configuration; only a failure
/// of the store itself is an error.
pub fn load_configuration<S: ConfigurationStore + ?Sized>(
    store: &S,
    owner: &str,
) -> Result<Configuration, StoreError> {
    match store.load(owner)? {
        Some(blob) => {
            debug!(owner, bytes = blob.len(), "loaded configuration blob");
            Ok(Configuration::from_json(&blob))
        }
        None => {
            debug!(owner, "no stored configuration, using empty configuration");
            Ok(Configuration::default())
        }
    }
}

/// A failed persist, carrying the session back so the edit can be retried.
#[derive(Error, Debug)]
#[error("failed to persist configuration: {source}")]
pub struct PersistError {
    session: Box<EditorSession>,
    #[source]
    source: StoreError,
}

impl PersistError {
    /// Recover the staged session, unchanged.
    pub fn into_session(self) -> EditorSession {
        *self.session
    }

    pub fn store_error(&self) -> &StoreError {
        &self.source
    }
}

/// Serialize the session's configuration and save it for `owner`.
///
/// On success the session is consumed and the persisted configuration returned;
/// a fresh session should be derived from it for further edits. On failure the
/// session comes back inside the error.
pub fn persist_session<S: ConfigurationStore + ?Sized>(
    store: &S,
    owner: &str,
    session: EditorSession,
) -> Result<Configuration, PersistError> {
    let config = session.commit();
    let saved = config
        .to_json()
        .map_err(StoreError::from)
        .and_then(|blob| store.save(owner, &blob));

    match saved {
        Ok(()) => {
            info!(owner, "configuration persisted");
            Ok(config)
        }
        Err(source) => {
            warn!(owner, error = %source, "configuration persist failed, session retained");
            Err(PersistError {
                session: Box::new(session),
                source,
            })
        }
    }
}

/// Process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw blob, bypassing serialization.
    pub fn with_blob(self, owner: &str, blob: &str) -> Self {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(owner.to_string(), blob.to_string());
        }
        self
    }
}

impl ConfigurationStore for MemoryStore {
    fn load(&self, owner: &str) -> Result<Option<String>, StoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(blobs.get(owner).cloned())
    }

    fn save(&self, owner: &str, blob: &str) -> Result<(), StoreError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        blobs.insert(owner.to_string(), blob.to_string());
        Ok(())
    }
}

/// One JSON file per owner inside a directory.
///
/// Saves write a temporary file and rename it over the target, so readers see
/// either the old or the new blob.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `owner`.
    ///
    /// `[A-Za-z0-9-]` is kept as-is; any other character, `_` included, becomes
    /// `_` followed by the hex of its UTF-8 bytes, so distinct owners never
    /// share a file.
    pub fn path_for(&self, owner: &str) -> PathBuf {
        let mut safe = String::with_capacity(owner.len());
        let mut buf = [0u8; 4];
        for c in owner.chars() {
            if c.is_ascii_alphanumeric() || c == '-' {
                safe.push(c);
            } else {
                safe.push('_');
                safe.push_str(&hex::encode(c.encode_utf8(&mut buf).as_bytes()));
            }
        }
        self.dir
            .join(format!("{safe}.{CONFIG_NAMESPACE}.{CONFIG_KEY}.json"))
    }
}

impl ConfigurationStore for FileStore {
    fn load(&self, owner: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(owner);
        match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(blob) => Ok(Some(blob)),
                Err(_) => {
                    // Unparsable like any other corrupt blob.
                    warn!(
                        owner,
                        path = %path.display(),
                        "configuration file is not valid UTF-8"
                    );
                    Ok(Some(String::new()))
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                owner: owner.to_string(),
                source,
            }),
        }
    }

    fn save(&self, owner: &str, blob: &str) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            owner: owner.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(owner);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(blob.as_bytes()).map_err(io_err)?;
        // A failed persist drops the temp file, which removes it.
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        debug!(owner, path = %path.display(), "configuration written");
        Ok(())
    }
}
