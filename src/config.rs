use crate::app_dirs::AppDirs;
use crate::text_source::{JsonTextSource, TextSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_TICK_RATE_MS: u64 = 150;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bank_path: Option<PathBuf>,
    pub tick_rate_ms: u64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_path: None,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Pick the bank: explicit override, configured path, user data file, then
    /// the bundled bank.
    pub fn text_source(&self, override_path: Option<&Path>) -> Box<dyn TextSource> {
        let explicit = override_path
            .map(Path::to_path_buf)
            .or_else(|| self.bank_path.clone());
        if let Some(path) = explicit {
            return Box::new(JsonTextSource::with_path(path));
        }
        match AppDirs::bank_path() {
            Some(path) if path.exists() => Box::new(JsonTextSource::with_path(path)),
            _ => Box::new(JsonTextSource::bundled()),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, writing the defaults out first when no file exists so
    /// there is something to edit.
    pub fn load_or_create(&self) -> Config {
        if self.path.exists() {
            return self.load();
        }
        let cfg = Config::default();
        if let Err(err) = self.save(&cfg) {
            warn!(path = %self.path.display(), error = %err, "could not write default config");
        }
        cfg
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
