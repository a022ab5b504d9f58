//! Process settings: where campaign artifacts live and where the server listens.
//!
//! Settings are read from a TOML file named by `BATCHRUN_SETTINGS`, falling back
//! to `batchrun.toml` in the working directory. A missing file is not an error;
//! every key has a default. Stores receive the relevant base path at
//! construction, so nothing here is global.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "BATCHRUN_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "batchrun.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<campaignId>.conf` files.
    pub config_base: PathBuf,
    /// Directory holding one `<campaignId>/` folder per campaign template.
    pub template_base: PathBuf,
    /// SQLite file backing the job audit journal.
    pub audit_db: PathBuf,
    pub host: String,
    pub port: u16,
    /// Upper bound for JSON request bodies.
    pub json_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_base: PathBuf::from("./configs"),
            template_base: PathBuf::from("./templates"),
            audit_db: PathBuf::from("jobq.sqlite"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            json_limit_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Settings {
    /// Loads settings from `$BATCHRUN_SETTINGS` or `./batchrun.toml`.
    pub fn load() -> Result<Self, SettingsError> {
        let path = env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
        Self::load_from(&path)
    }

    /// Loads settings from `path`, or returns defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
