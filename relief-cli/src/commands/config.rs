//! Config commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;

use relief_core::config::{AppConfig, ConfigHandle};
use relief_core::error::{ReliefError, ReliefResult};

use super::print_json;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the path of the configuration file.
    Path,
    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file without asking.
        #[arg(long)]
        force: bool,
    },
}

fn config_path(explicit: Option<&str>) -> ReliefResult<PathBuf> {
    match explicit {
        Some(p) => Ok(PathBuf::from(p)),
        None => AppConfig::default_config_path(),
    }
}

pub async fn run(
    config: ConfigHandle,
    explicit_path: Option<&str>,
    action: ConfigAction,
    format: OutputFormat,
) -> ReliefResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => print_json(&*cfg),
                OutputFormat::Text => print!("{}", cfg.to_toml()?),
            }
        }

        ConfigAction::Path => {
            let path = config_path(explicit_path)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "exists": path.exists(),
                })),
                OutputFormat::Text => {
                    let note = if path.exists() { "" } else { " (not created yet)" };
                    println!("{}{note}", path.display());
                }
            }
        }

        ConfigAction::Init { force } => {
            let path = config_path(explicit_path)?;
            if path.exists() && !force {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} already exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()
                    .map_err(|e| ReliefError::Internal(e.to_string()))?;
                if !overwrite {
                    println!("Left {} unchanged.", path.display());
                    return Ok(());
                }
            }

            AppConfig::default().save_to_file(&path)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "written": true,
                })),
                OutputFormat::Text => println!(
                    "{} wrote default configuration to {}",
                    style("OK").green().bold(),
                    path.display()
                ),
            }
        }
    }
    Ok(())
}
