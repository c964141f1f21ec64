//! Replace the backend collection with the sample incident set.

use serde::Serialize;

use emberwatch_core::{SeedReport, reseed};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{backend_config, util};

#[derive(Serialize)]
struct SeedOutput {
    collection: String,
    #[serde(flatten)]
    report: SeedReport,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = backend_config(global)?;
    let missing = config.missing_parameters();
    if !missing.is_empty() {
        return Err(CliError::NotConfigured {
            missing: missing.join(", "),
        });
    }

    let project = config.project_id.clone().unwrap_or_default();
    let prompt = format!(
        "Delete every incident in '{}' of project '{project}' and write the sample set?",
        config.collection
    );
    if !util::confirm(&prompt, "seed", global.yes)? {
        output::note(&global.output, global.quiet, "Aborted.");
        return Ok(());
    }

    let report = reseed(&config).await?;
    let out = SeedOutput {
        collection: config.collection.clone(),
        report,
    };
    let rendered = output::render_single(
        &global.output,
        &out,
        |o| {
            format!(
                "Cleared {} and added {} incidents to '{}'.",
                o.report.removed, o.report.created, o.collection
            )
        },
        |o| o.report.created.to_string(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
