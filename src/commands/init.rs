use crate::config::{TempographConfig, CONFIG_FILE_NAME};
use crate::io;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const HEADER: &str = "# tempograph configuration\n# Every key is optional; omitted keys keep their defaults.\n\n";

/// Writes the default configuration into `dir` and returns its path.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    let body = toml::to_string_pretty(&TempographConfig::default())
        .context("Failed to serialize default configuration")?;
    io::write_file(&config_path, format!("{}{}", HEADER, body).as_bytes())?;
    log::info!("Created {}", config_path.display());
    Ok(config_path)
}
