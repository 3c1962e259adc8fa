//! Where the stores live on disk, and opening all of them at once.

use crate::error::{Error, Result};
use crate::kinds::{AppUserStore, ClientStore, PreferenceStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File layout for the three entity stores.
///
/// Deserializable so it can sit inside a host application's config file;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Directory holding the backing files. Created on demand.
    pub data_dir: PathBuf,
    /// File name of the client store.
    pub clients_file: String,
    /// File name of the application-user store.
    pub users_file: String,
    /// File name of the preference store.
    pub preferences_file: String,
    /// Indent the JSON on disk.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            clients_file: "clients.json".into(),
            users_file: "users.json".into(),
            preferences_file: "preferences.json".into(),
            pretty: false,
        }
    }
}

impl StoreConfig {
    /// Defaults, rooted at `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Each file name must be a bare, non-empty name inside `data_dir`.
    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("clientsFile", &self.clients_file),
            ("usersFile", &self.users_file),
            ("preferencesFile", &self.preferences_file),
        ] {
            let bare = Path::new(name).file_name().map(|n| n == name.as_str()).unwrap_or(false);
            if name.trim().is_empty() || !bare {
                return Err(Error::Config(format!("{key} must be a plain file name, got {name:?}")));
            }
        }
        Ok(())
    }

    /// Backing file of the client store.
    pub fn clients_path(&self) -> PathBuf {
        self.data_dir.join(&self.clients_file)
    }

    /// Backing file of the application-user store.
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    /// Backing file of the preference store.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(&self.preferences_file)
    }
}

/// One store per entity kind, opened from a single [`StoreConfig`].
#[derive(Debug)]
pub struct Stores {
    /// API clients.
    pub clients: ClientStore,
    /// Application users.
    pub users: AppUserStore,
    /// User preferences.
    pub preferences: PreferenceStore,
}

impl Stores {
    /// Open (or create) all three stores. Fails only on an invalid config;
    /// I/O trouble degrades the affected store instead.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clients: ClientStore::builder(config.clients_path()).pretty(config.pretty).build(),
            users: AppUserStore::builder(config.users_path()).pretty(config.pretty).build(),
            preferences: PreferenceStore::builder(config.preferences_path()).pretty(config.pretty).build(),
        })
    }
}
