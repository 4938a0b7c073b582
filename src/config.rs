//! Layered configuration: defaults, then the first config file found, then `EVGRID_*`
//! environment variables, then command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::AppError;

pub const CONFIG_ENV: &str = "EVGRID_CONFIG";
pub const CONFIG_FILE: &str = "evgrid.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    /// Rolling file output goes here; console only when unset.
    pub dir: Option<PathBuf>,
    pub retention: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), dir: None, retention: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    /// Keep everything in memory; `data_dir` is ignored.
    pub in_memory: bool,
    pub cors_origin: String,
    /// Also store reported errors in the `errorlogs` collection.
    pub persist_error_logs: bool,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5001".into(),
            data_dir: PathBuf::from("./data"),
            in_memory: false,
            cors_origin: "http://localhost:3000".into(),
            persist_error_logs: true,
            log: LogConfig::default(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub in_memory: bool,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Resolves every layer against the real process environment.
    ///
    /// # Errors
    /// An unreadable or invalid config file, or an invalid environment value.
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, AppError> {
        let env = |key: &str| std::env::var(key).ok();
        let home = dirs_next::home_dir();
        Self::load_with(explicit, home.as_deref(), &env, overrides)
    }

    /// [`AppConfig::load`] with the environment and home directory injected.
    ///
    /// # Errors
    /// As for [`AppConfig::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        home: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, AppError> {
        let mut cfg = match candidate_paths(explicit, home, env).into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_env(env)?;
        cfg.apply_overrides(overrides);
        Ok(cfg)
    }

    /// # Errors
    /// Unreadable file or invalid TOML.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        let cfg = toml::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("config: loaded {}", path.display());
        Ok(cfg)
    }

    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<(), AppError> {
        if let Some(v) = env("EVGRID_BIND") {
            self.bind = v;
        }
        if let Some(v) = env("EVGRID_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = env("EVGRID_LOG_DIR") {
            self.log.dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env("EVGRID_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = env("EVGRID_LOG_RETENTION") {
            self.log.retention = v
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("EVGRID_LOG_RETENTION: not a count: {v}")))?;
        }
        if let Some(v) = env("EVGRID_CORS_ORIGIN") {
            self.cors_origin = v;
        }
        if let Some(v) = env("EVGRID_ERROR_LOG_STORE") {
            self.persist_error_logs = parse_flag(&v)
                .ok_or_else(|| AppError::Config(format!("EVGRID_ERROR_LOG_STORE: not a flag: {v}")))?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, o: &ConfigOverrides) {
        if let Some(b) = &o.bind {
            self.bind.clone_from(b);
        }
        if let Some(d) = &o.data_dir {
            self.data_dir.clone_from(d);
        }
        if o.in_memory {
            self.in_memory = true;
        }
        if let Some(l) = &o.log_level {
            self.log.level.clone_from(l);
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn candidate_paths(
    explicit: Option<&Path>,
    home: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = env(CONFIG_ENV) {
        paths.push(PathBuf::from(p));
    }
    if let Some(h) = home {
        paths.push(h.join(".config").join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}
