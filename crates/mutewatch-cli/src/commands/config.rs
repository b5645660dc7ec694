//! Settings file inspection and editing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use mutewatch_config::{FLAG_KEYS, Settings, TEXT_KEYS, default_cue_path, lint, validate};
use mutewatch_core::SETTING_PARAMS;

use super::common::{load_settings, resolve_settings_path};

#[derive(Args)]
pub struct ConfigArgs {
    /// Settings file to use instead of the per-user default
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show every setting with its range
    Show,

    /// Print the settings file and default cue locations
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Change one setting and save
    Set {
        /// Setting key (see `mutewatch config show`)
        key: String,
        /// New value; numbers are clamped to the setting's range
        value: String,
    },

    /// Check the settings file for errors and suspicious values
    Validate,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let path = resolve_settings_path(args.settings.as_deref());

    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => {
            let settings = load_settings(&path)?;
            let source = if path.exists() { "" } else { " (defaults)" };
            println!("Settings: {}{}", path.display(), source);
            println!();
            println!("  {:20}  {:>10}  {}", "Key", "Value", "Range");
            println!("  {:20}  {:>10}  {}", "---", "-----", "-----");
            for desc in &SETTING_PARAMS {
                let value = settings.get(desc.key)?;
                println!(
                    "  {:20}  {:>10}  {} .. {}{}",
                    desc.key,
                    value,
                    desc.min,
                    desc.max,
                    desc.unit.suffix()
                );
            }
            for key in FLAG_KEYS {
                println!("  {:20}  {:>10}", key, settings.get(key)?);
            }
            for key in TEXT_KEYS {
                let value = settings.get(key)?;
                let shown = if value.is_empty() { "-" } else { value.as_str() };
                println!("  {:20}  {:>10}", key, shown);
            }
            println!();
            println!("Cue file in use: {}", settings.cue_path().display());
        }

        ConfigCommand::Path => {
            println!("Settings: {}", path.display());
            println!("Default cue: {}", default_cue_path().display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Settings::default().save(&path)?;
            println!("Wrote default settings to {}", path.display());
        }

        ConfigCommand::Set { key, value } => {
            let mut settings = load_settings(&path)?;
            settings.set(&key, &value)?;
            for warning in lint(&settings) {
                println!("warning: {warning}");
            }
            settings
                .save(&path)
                .with_context(|| format!("failed to save {}", path.display()))?;
            println!("{} = {}", key, settings.get(&key)?);
        }

        ConfigCommand::Validate => {
            let settings = load_settings(&path)?;
            let warnings = lint(&settings);
            for warning in &warnings {
                println!("warning: {warning}");
            }
            validate(&settings).with_context(|| format!("{} is invalid", path.display()))?;
            if warnings.is_empty() {
                println!("{}: OK", path.display());
            } else {
                println!("{}: OK with {} warning(s)", path.display(), warnings.len());
            }
        }
    }

    Ok(())
}
