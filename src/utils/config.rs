use std::fs::File;
use std::io::{Write, BufRead, BufReader};
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use tracing::info;

pub const DEFAULT_ENV_FILE: &str = ".env";

const MAX_IMAGE_BYTES_KEY: &str = "TURBIDITY_MAX_IMAGE_BYTES";
const LOG_KEY: &str = "TURBIDITY_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Encoded images larger than this are rejected before decoding.
    pub max_image_bytes: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

/// Main entry point to get settings.
/// Defaults, then the env file (if present), then process environment variables.
pub fn load_settings(env_file: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    match env_file {
        Some(path) => {
            apply_env_file(&mut settings, path)?;
        }
        None => {
            let path = Path::new(DEFAULT_ENV_FILE);
            if path.exists() {
                apply_env_file(&mut settings, path)?;
            }
        }
    }

    for key in [MAX_IMAGE_BYTES_KEY, LOG_KEY] {
        if let Ok(value) = std::env::var(key) {
            apply(&mut settings, key, &value)?;
        }
    }

    Ok(settings)
}

fn apply_env_file(settings: &mut Settings, path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open config file {:?}", path))?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            apply(settings, key.trim(), value.trim())?;
        }
    }
    Ok(())
}

fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        MAX_IMAGE_BYTES_KEY => {
            settings.max_image_bytes = value
                .parse()
                .map_err(|e| anyhow!("Invalid {} value '{}': {}", key, value, e))?;
        }
        LOG_KEY => settings.log_level = value.to_string(),
        _ => {}
    }
    Ok(())
}

pub fn save_to_env(path: &Path, settings: &Settings) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    writeln!(file, "{}={}", MAX_IMAGE_BYTES_KEY, settings.max_image_bytes)?;
    writeln!(file, "{}={}", LOG_KEY, settings.log_level)?;
    info!("Saved settings to {:?}", path);
    Ok(())
}
