//! `migrant init` command

use anyhow::{Context, Result};
use colored::Colorize;
use migrant_core::Config;
use std::path::Path;

/// Write the effective configuration to the config file
///
/// An existing file is left alone unless `force` is set.
pub fn init(config: &Config, path: Option<&Path>, force: bool) -> Result<()> {
    let target = path.map_or_else(Config::config_path, Path::to_path_buf);
    if target.exists() && !force {
        println!(
            "{} Config already exists: {} (use --force to overwrite)",
            "⚠".yellow().bold(),
            target.display()
        );
        return Ok(());
    }

    let written = match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    };
    written.with_context(|| format!("Config not written: {}", target.display()))?;
    println!("{} Config written: {}", "✓".green().bold(), target.display().to_string().bold());
    Ok(())
}
