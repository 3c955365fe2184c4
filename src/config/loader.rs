use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use super::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

pub fn config_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Ok(PathBuf::from(appdata).join("custnote"));
        }
        if let Ok(home) = std::env::var("USERPROFILE") {
            return Ok(PathBuf::from(home).join("AppData\\Roaming").join("custnote"));
        }
        Err(anyhow!("APPDATA not set; cannot determine config directory"))
    } else {
        if let Ok(home) = std::env::var("HOME") {
            return Ok(PathBuf::from(home).join(".custnote"));
        }
        Err(anyhow!("HOME not set; cannot determine config directory"))
    }
}

fn home_dir() -> Result<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var(var)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("{} not set; cannot determine storage root", var))
}

pub fn default_settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Default settings for a settings file at `path`: the live database sits
/// next to it under `data/`, backups go under the user's home directory.
pub fn default_settings(path: &Path) -> Result<Settings> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("invalid settings path {}", path.display()))?;
    Ok(Settings::new(dir.join("data"), home_dir()?))
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return default_settings(path);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    if content.trim().is_empty() {
        return default_settings(path);
    }
    match serde_json::from_str::<Settings>(&content) {
        Ok(settings) => Ok(settings),
        Err(err) => {
            // Leave the broken file in place so the user can inspect it.
            warn!(path = %path.display(), error = %err, "settings file is corrupt; using defaults");
            default_settings(path)
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("invalid settings path {}", path.display()))?;
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = dir.join(format!("{}.tmp", SETTINGS_FILE));
    fs::write(&tmp, json)?;
    // Windows refuses to rename over an existing file.
    if cfg!(windows) && path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
