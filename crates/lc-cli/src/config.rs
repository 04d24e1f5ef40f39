use std::path::{Path, PathBuf};

use anyhow::Context;
use lc_chaincode::LifecyclePolicy;
use lc_server::ServerConfig;
use lc_store::{SyncMode, WalConfig};
use serde::{Deserialize, Serialize};

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "lc.toml";

/// Effective settings for every `lc` subcommand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcConfig {
    pub ledger_path: PathBuf,
    pub sync_mode: SyncMode,
    pub lifecycle: LifecyclePolicy,
    pub server: ServerConfig,
}

impl Default for LcConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("lc-ledger.wal"),
            sync_mode: SyncMode::default(),
            lifecycle: LifecyclePolicy::default(),
            server: ServerConfig::default(),
        }
    }
}

impl LcConfig {
    /// Load `path`, or `lc.toml` if it exists, or fall back to defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn wal_config(&self) -> WalConfig {
        WalConfig {
            sync_mode: self.sync_mode,
        }
    }
}
