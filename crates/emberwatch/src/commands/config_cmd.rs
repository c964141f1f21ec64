//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Input, Password};

use emberwatch_config::{self as config, Settings};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

// ── Helpers ─────────────────────────────────────────────────────────

fn target_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// Copy of the settings safe to print.
fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    if shown.backend.api_key.is_some() {
        shown.backend.api_key = Some("****".into());
    }
    shown
}

/// Optional free-text prompt; blank input means "unset".
fn prompt_optional(prompt: &str, current: Option<&str>) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(current.unwrap_or_default().to_owned())
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = target_path(global);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let settings = redacted(&config::load_settings_from(&path)?);
            let rendered = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&settings)?,
                OutputFormat::JsonCompact => serde_json::to_string(&settings)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&settings)?,
            };
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            eprintln!("🚨 emberwatch configuration");
            eprintln!("   Config path: {}\n", path.display());

            if path.exists()
                && !util::confirm(
                    &format!("{} exists. Overwrite?", path.display()),
                    "config overwrite",
                    global.yes,
                )?
            {
                eprintln!("Aborted.");
                return Ok(());
            }

            let mut settings = config::load_settings_from(&path)?;

            let project_id: String = Input::new()
                .with_prompt("Project id")
                .with_initial_text(settings.backend.project_id.clone().unwrap_or_default())
                .interact_text()
                .map_err(prompt_err)?;
            if project_id.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "project_id".into(),
                    reason: "project id cannot be empty".into(),
                });
            }

            let api_key = Password::new()
                .with_prompt("API key")
                .interact()
                .map_err(prompt_err)?;
            if api_key.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }

            let database_url = prompt_optional(
                "Realtime database URL (blank to skip alerts)",
                settings.backend.database_url.as_deref(),
            )?;

            settings.backend.project_id = Some(project_id.trim().to_owned());
            settings.backend.api_key = Some(api_key.trim().to_owned());
            settings.backend.database_url = database_url;

            // Reject what would fail at load time.
            settings.to_backend_config()?;
            config::save_settings(&settings, &path)?;

            eprintln!("\n✓ Saved {}", path.display());
            Ok(())
        }
    }
}
