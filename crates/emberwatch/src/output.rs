//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use emberwatch_core::{EmergencyStatus, EmergencyType};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status label, colored by urgency.
pub fn paint_status(status: EmergencyStatus, color: bool) -> String {
    let label = status.label();
    if !color {
        return label.to_owned();
    }
    match status {
        EmergencyStatus::Pending => label.red().bold().to_string(),
        EmergencyStatus::InProgress => label.yellow().to_string(),
        EmergencyStatus::Resolved => label.green().dimmed().to_string(),
    }
}

/// Type with its marker glyph.
pub fn paint_kind(kind: EmergencyType, color: bool) -> String {
    let text = format!("{} {kind}", kind.emoji());
    if !color {
        return text;
    }
    match kind {
        EmergencyType::Fire => text.bright_red().to_string(),
        EmergencyType::Medical => text.bright_blue().to_string(),
        EmergencyType::Patrol => text.bright_magenta().to_string(),
    }
}

pub fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a human note to stderr. Suppressed in quiet mode and for
/// machine-readable formats.
pub fn note(format: &OutputFormat, quiet: bool, message: &str) {
    if quiet || !matches!(format, OutputFormat::Table) {
        return;
    }
    eprintln!("{message}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncolored_labels_are_plain() {
        assert_eq!(paint_status(EmergencyStatus::InProgress, false), "In Progress");
        assert_eq!(paint_kind(EmergencyType::Fire, false), "🔥 Fire");
    }

    #[derive(Tabled)]
    struct Row {
        name: String,
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &["a", "b"],
            |s| Row {
                name: (*s).to_owned(),
            },
            |s| (*s).to_owned(),
        )
        .unwrap_or_default();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn table_has_header() {
        let out = render_list(
            &OutputFormat::Table,
            &["a"],
            |s| Row {
                name: (*s).to_owned(),
            },
            |s| (*s).to_owned(),
        )
        .unwrap_or_default();
        assert!(out.contains("name"));
        assert!(out.contains('a'));
    }
}
