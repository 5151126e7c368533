//! Credential storage.
//!
//! The client reads the access token on every request, writes the token pair
//! after sign-in and refresh, and clears the session keys when the session
//! is unrecoverable. Stores are synchronous key-value maps; write failures
//! are logged and swallowed.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// Key of the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key of the signed-in user's id.
pub const USER_ID_KEY: &str = "userId";

/// Key of the signed-in user's profile (JSON).
pub const USER_PROFILE_KEY: &str = "user";

/// Every key that belongs to a session.
pub const SESSION_KEYS: [&str; 4] = [
    ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USER_ID_KEY,
    USER_PROFILE_KEY,
];

/// Key-value credential persistence.
pub trait CredentialStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str);

    /// Delete a value.
    fn remove(&self, key: &str);

    /// Delete every session key.
    fn clear_session(&self) {
        for key in SESSION_KEYS {
            self.remove(key);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryCredentialStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding an access/refresh token pair.
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store.set(ACCESS_TOKEN_KEY, access_token);
        store.set(REFRESH_TOKEN_KEY, refresh_token);
        store
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileCredentialStore
// ─────────────────────────────────────────────────────────────────────────────

/// Default credentials file name within the campus config directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Credential store persisted as a JSON object on disk.
///
/// The whole map is cached in memory and rewritten on every mutation.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Open (or lazily create) the credentials file in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(CREDENTIALS_FILE))
    }

    /// Open the store at an explicit path.
    ///
    /// An unreadable or corrupt file starts the store empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt credentials file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("Failed to create credentials directory: {}", e);
            return;
        }

        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize credentials: {}", e);
                return;
            }
        };

        if let Err(e) = write_private(&self.path, &json) {
            tracing::warn!(
                "Failed to write credentials file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Write `contents` to `path`, readable only by the owner on Unix.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
