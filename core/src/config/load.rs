use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default conductor data directory: ~/.conductor
fn conductor_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".conductor"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.conductor/config.toml
    let home_config = conductor_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
    Ok(cfg)
}

/// Environment variable overrides (highest priority). Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("WINDMILL_URL") {
        cfg.windmill.base_url = v;
    }
    if let Some(v) = get("WINDMILL_TOKEN") {
        cfg.windmill.token = v;
    }
    if let Some(v) = get("WINDMILL_WORKSPACE") {
        cfg.windmill.workspace = v;
    }
    if let Some(v) = get("HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = get("PORT") {
        match v.trim().parse::<u16>() {
            Ok(port) => cfg.server.port = port,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid PORT override"),
        }
    }
    if let Some(v) = get("LOG_LEVEL") {
        cfg.logging.level = v.to_lowercase();
    }
}
