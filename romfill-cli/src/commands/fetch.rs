use std::path::Path;
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use romfill_core::{Obligation, Outcome};
use romfill_fetch::{
    AbortReason, BatchEvent, BatchReport, CancellationToken, FetchClient, Settings, run_batch,
    run_with_events,
};

use crate::CliError;
use crate::cli_types::{FilterArgs, JobArgs};
use crate::commands::apply_filter;
use crate::format::{format_progress, format_rate};

/// Exit code when the batch stopped early (credentials, rate limit, Ctrl-C).
const EXIT_ABORTED: u8 = 2;

/// Run the fetch command.
pub(crate) fn run_fetch(
    args: JobArgs,
    filter: FilterArgs,
    dry_run: bool,
    no_cleanup: bool,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let job = Settings::load()
        .with_overrides(
            args.url,
            args.username,
            args.password,
            args.report,
            args.dest,
            no_cleanup.then_some(false),
        )
        .into_job()?;

    if !job.report.is_file() {
        return Err(CliError::config(format!(
            "Report file not found: {}",
            job.report.display()
        )));
    }

    let obligations = apply_filter(romfill_core::parse_report(&job.report), &filter);
    if obligations.is_empty() {
        log::info!(
            "{} Nothing to download, {} lists no missing files.",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            job.report.display(),
        );
        return Ok(ExitCode::SUCCESS);
    }

    if dry_run {
        for ob in &obligations {
            log::info!(
                "  {} {}",
                format!("{:<6}", ob.kind().short_name()).if_supports_color(Stdout, |t| t.cyan()),
                ob.remote_path(),
            );
        }
        crate::log_blank();
        log::info!(
            "{} item(s) would be downloaded to {}",
            obligations.len(),
            job.destination.display(),
        );
        return Ok(ExitCode::SUCCESS);
    }

    let client = FetchClient::new(&job.origin, job.credentials.clone())
        .map_err(|e| CliError::config(e.to_string()))?;

    log::info!(
        "Downloading {} item(s) from {} to {}",
        obligations.len(),
        client.origin().as_str().if_supports_color(Stdout, |t| t.cyan()),
        job.destination.display(),
    );
    crate::log_blank();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;
    let cancel = CancellationToken::new();
    let report = rt.block_on(async {
        // Stays armed through cleanup; the rewrite is atomic and always completes.
        let watcher = watch_interrupt(&cancel);
        let report = download_all(&client, &obligations, &job.destination, &cancel, quiet).await;

        crate::log_blank();
        if job.cleanup_report {
            cleanup(&job.report, &report);
        }
        watcher.abort();
        report
    });

    log::info!(
        "{} downloaded, {} failed, {} not attempted",
        report.succeeded_count(),
        report.failed_count(),
        obligations.len() - report.results.len(),
    );

    match stop_reason(&report, &cancel) {
        Some(reason) => {
            log::warn!(
                "{} {}",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                reason,
            );
            Ok(ExitCode::from(EXIT_ABORTED))
        }
        None => {
            log::info!(
                "{} All downloads finished.",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn watch_interrupt(cancel: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping...");
            cancel.cancel();
        }
    })
}

/// Why the run stopped early, counting a Ctrl-C that arrived after the last item.
fn stop_reason(report: &BatchReport, cancel: &CancellationToken) -> Option<AbortReason> {
    report
        .abort
        .or_else(|| cancel.is_cancelled().then_some(AbortReason::Canceled))
}

async fn download_all(
    client: &FetchClient,
    obligations: &[Obligation],
    dest: &Path,
    cancel: &CancellationToken,
    quiet: bool,
) -> BatchReport {
    let pb = progress_bar(quiet);
    let total = obligations.len();
    let (tx, rx) = mpsc::unbounded_channel();

    let report = run_with_events(
        async {
            let report = run_batch(client, obligations, dest, cancel, &tx).await;
            drop(tx);
            report
        },
        rx,
        |event| handle_event(&pb, total, event),
    )
    .await;

    pb.finish_and_clear();
    report
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "  {spinner:.cyan} [{prefix}] {bar:25.cyan/blue} {percent:>3}% {wide_msg}",
        )
        .expect("static pattern")
        .progress_chars("=> ")
        .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn handle_event(pb: &ProgressBar, total: usize, event: BatchEvent) {
    match event {
        BatchEvent::ItemStarted { index, obligation } => {
            pb.set_length(0);
            pb.set_position(0);
            pb.set_prefix(format!("{}/{}", index + 1, total));
            pb.set_message(obligation.file_name().to_string());
        }
        BatchEvent::Progress { sample, .. } => {
            if let Some(len) = sample.total_bytes {
                pb.set_length(len);
            }
            pb.set_position(sample.bytes_received);
            pb.set_message(format!(
                "{}  {}  {}",
                sample.file_name,
                format_progress(sample.bytes_received, sample.total_bytes),
                format_rate(sample.bytes_per_second),
            ));
        }
        BatchEvent::ItemFinished {
            obligation,
            outcome,
            ..
        } => pb.suspend(|| log_outcome(&obligation, &outcome)),
        BatchEvent::Started { .. } | BatchEvent::Aborted { .. } | BatchEvent::Done { .. } => {}
    }
}

fn log_outcome(obligation: &Obligation, outcome: &Outcome) {
    let label = outcome.label();
    if outcome.is_success() {
        log::info!(
            "  {} {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            obligation,
            label.if_supports_color(Stdout, |t| t.dimmed()),
        );
    } else if outcome.aborts_batch() {
        log::warn!(
            "  {} {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            obligation,
            label.if_supports_color(Stdout, |t| t.yellow()),
        );
    } else {
        log::warn!(
            "  {} {} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            obligation,
            label.if_supports_color(Stdout, |t| t.red()),
        );
    }
}

/// Prune what arrived from the report, even when the batch stopped early.
fn cleanup(report_path: &Path, report: &BatchReport) {
    let successes = report.successes();
    if successes.is_empty() {
        return;
    }
    match romfill_core::clean_report(report_path, &successes) {
        Some(summary) if !summary.is_empty() => log::info!(
            "{} Updated {}: {} entr{} removed, {} empty set(s) dropped",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            report_path.display(),
            summary.removed_lines,
            if summary.removed_lines == 1 { "y" } else { "ies" },
            summary.dropped_headers,
        ),
        Some(_) => log::debug!("Report {} already up to date", report_path.display()),
        None => log::warn!(
            "{} Could not update {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report_path.display(),
        ),
    }
}
