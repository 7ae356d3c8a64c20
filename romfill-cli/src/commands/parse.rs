use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romfill_core::AssetKind;
use romfill_fetch::Settings;

use crate::CliError;
use crate::cli_types::FilterArgs;
use crate::commands::apply_filter;

/// List the obligations a report yields, grouped counts at the end.
pub(crate) fn run_parse(report: Option<PathBuf>, filter: FilterArgs) -> Result<(), CliError> {
    let path = report
        .or_else(|| Settings::load().report)
        .ok_or_else(|| CliError::config("No report given and none configured"))?;
    if !path.is_file() {
        return Err(CliError::config(format!(
            "Report file not found: {}",
            path.display()
        )));
    }

    let obligations = apply_filter(romfill_core::parse_report(&path), &filter);

    log::info!(
        "{}",
        format!("Missing files in {}", path.display()).if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    for ob in &obligations {
        log::info!(
            "  {} {:<20} {}",
            format!("{:<6}", ob.kind().short_name()).if_supports_color(Stdout, |t| t.cyan()),
            ob.set_name(),
            ob.file_name(),
        );
    }

    crate::log_blank();
    let counts: Vec<String> = AssetKind::all()
        .iter()
        .map(|kind| {
            let n = obligations.iter().filter(|ob| ob.kind() == *kind).count();
            format!("{} {}", n, kind.folder())
        })
        .collect();
    log::info!("{} item(s): {}", obligations.len(), counts.join(", "));

    Ok(())
}
