pub mod ask;
pub mod doctor;
pub mod onboard;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::Context;
use sunbae_config::AppConfig;

/// The config file in use: `--config` if given, else the default location.
pub fn config_file(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load the config file plus environment overrides.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = config_file(explicit);
    AppConfig::load_with_env(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}
