//! Persistent channel/credential configuration.
//!
//! The config file is a small TOML record, by default at
//! `~/.config/toottally/twitch.toml`. Fresh installs get the sentinel
//! defaults, which the session manager treats as "not configured yet" and
//! refuses to connect with.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Placeholder channel name meaning "not configured by the user".
pub const SENTINEL_CHANNEL_NAME: &str = "ChannelName";
/// Placeholder access token meaning "not configured by the user".
pub const SENTINEL_ACCESS_TOKEN: &str = "";

/// Immutable config snapshot the session manager reads once per
/// initialization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub channel_name: String,
    pub access_token: String,
}

impl SessionConfig {
    /// True when the channel name is non-empty and not the sentinel default.
    pub fn channel_name_is_set(&self) -> bool {
        !self.channel_name.is_empty() && self.channel_name != SENTINEL_CHANNEL_NAME
    }

    /// True when the access token is non-empty.
    pub fn access_token_is_set(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Supplies the current channel/credential pair and persists edits.
///
/// The session manager only ever reads a [`SessionConfig`] snapshot; the
/// provider (typically driven by a settings UI) owns all mutation.
pub trait ConfigProvider: Send + Sync {
    fn channel_name(&self) -> String;
    fn access_token(&self) -> String;
    fn set_channel_name(&self, name: &str, persist: bool);
    fn set_access_token(&self, token: &str, persist: bool);

    /// Snapshot of the current values, taken once per `initialize()` call so
    /// a concurrent edit can't race between read and use.
    fn snapshot(&self) -> SessionConfig {
        SessionConfig {
            channel_name: self.channel_name(),
            access_token: self.access_token(),
        }
    }
}

/// Error reading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("can't read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk shape of the config record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredConfig {
    pub channel_name: String,
    pub access_token: String,
}

impl Default for StoredConfig {
    fn default() -> Self {
        Self {
            channel_name: SENTINEL_CHANNEL_NAME.to_string(),
            access_token: SENTINEL_ACCESS_TOKEN.to_string(),
        }
    }
}

impl StoredConfig {
    /// Load from `path`. The caller decides how to handle a missing or
    /// unreadable file; [`FileConfigProvider::open`] falls back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// File-backed [`ConfigProvider`].
///
/// Writes are best-effort: a failed save is logged as a warning and the
/// in-memory values stay authoritative for the rest of the process.
pub struct FileConfigProvider {
    path: PathBuf,
    state: Mutex<StoredConfig>,
}

impl FileConfigProvider {
    /// Default config file location under the user config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toottally")
            .join("twitch.toml")
    }

    /// Open `path`, falling back to sentinel defaults when the file is
    /// missing or unreadable (a bad file is logged, not fatal).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = if path.exists() {
            match StoredConfig::load(&path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(error = %e, "falling back to default twitch config");
                    StoredConfig::default()
                }
            }
        } else {
            StoredConfig::default()
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Path this provider persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, state: &StoredConfig) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match toml::to_string_pretty(state) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %e, "can't save twitch config");
                }
            }
            Err(e) => tracing::warn!(error = %e, "can't serialize twitch config"),
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn channel_name(&self) -> String {
        self.state.lock().channel_name.clone()
    }

    fn access_token(&self) -> String {
        self.state.lock().access_token.clone()
    }

    fn set_channel_name(&self, name: &str, persist: bool) {
        let mut state = self.state.lock();
        state.channel_name = name.to_string();
        if persist {
            self.save(&state);
        }
    }

    fn set_access_token(&self, token: &str, persist: bool) {
        let mut state = self.state.lock();
        state.access_token = token.to_string();
        if persist {
            self.save(&state);
        }
    }
}
