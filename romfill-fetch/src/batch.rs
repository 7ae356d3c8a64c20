use std::fmt;
use std::path::Path;

use romfill_core::{Obligation, Outcome, ProgressSample};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::Fetcher;

/// Events emitted by [`run_batch`] for progress reporting.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// The batch is about to start.
    Started { total: usize },
    /// An obligation is being fetched.
    ItemStarted { index: usize, obligation: Obligation },
    /// Bytes arrived for the current obligation.
    Progress { index: usize, sample: ProgressSample },
    /// An obligation reached its terminal outcome.
    ItemFinished {
        index: usize,
        obligation: Obligation,
        outcome: Outcome,
    },
    /// The batch stopped early. No further items will be fetched.
    Aborted { reason: AbortReason },
    /// The batch is over, whether it ran to completion or not.
    Done { succeeded: usize, failed: usize },
}

/// Why a batch stopped before the last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Unauthorized,
    RateLimited,
    Canceled,
}

impl AbortReason {
    fn from_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Unauthorized => Some(Self::Unauthorized),
            Outcome::RateLimited => Some(Self::RateLimited),
            Outcome::Canceled => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => f.write_str("Stopped: the server rejected the credentials."),
            Self::RateLimited => f.write_str("Stopped: rate limit reached, try again later."),
            Self::Canceled => f.write_str("Stopped: canceled."),
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Every attempted obligation with its outcome, in download order.
    pub results: Vec<(Obligation, Outcome)>,
    pub abort: Option<AbortReason>,
}

impl BatchReport {
    /// Obligations that were downloaded completely, for report cleanup.
    pub fn successes(&self) -> Vec<Obligation> {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .map(|(ob, _)| ob.clone())
            .collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_success()).count()
    }

    /// Attempted items that did not succeed. A canceled item counts as failed.
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.succeeded_count()
    }

    pub fn is_complete(&self) -> bool {
        self.abort.is_none()
    }
}

/// Fetch `obligations` one at a time, in order.
///
/// Stops at the first outcome that aborts the batch, or when `cancel` fires
/// between items. Items after the stopping point are not attempted.
pub async fn run_batch<F: Fetcher>(
    fetcher: &F,
    obligations: &[Obligation],
    dest: &Path,
    cancel: &CancellationToken,
    events: &mpsc::UnboundedSender<BatchEvent>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let _ = events.send(BatchEvent::Started {
        total: obligations.len(),
    });
    log::info!("Fetching {} item(s) into {}", obligations.len(), dest.display());

    for (index, obligation) in obligations.iter().enumerate() {
        if cancel.is_cancelled() {
            report.abort = Some(AbortReason::Canceled);
            break;
        }

        let _ = events.send(BatchEvent::ItemStarted {
            index,
            obligation: obligation.clone(),
        });

        let forward = |sample: ProgressSample| {
            let _ = events.send(BatchEvent::Progress { index, sample });
        };
        let outcome = fetcher
            .fetch(obligation, dest, cancel, Some(&forward))
            .await;

        let abort = AbortReason::from_outcome(&outcome);
        let _ = events.send(BatchEvent::ItemFinished {
            index,
            obligation: obligation.clone(),
            outcome: outcome.clone(),
        });
        report.results.push((obligation.clone(), outcome));

        if let Some(reason) = abort {
            report.abort = Some(reason);
            break;
        }
    }

    if let Some(reason) = report.abort {
        log::warn!("Batch stopped after {} item(s): {}", report.results.len(), reason);
        let _ = events.send(BatchEvent::Aborted { reason });
    }

    let succeeded = report.succeeded_count();
    let failed = report.failed_count();
    log::info!("Batch finished: {} succeeded, {} failed", succeeded, failed);
    let _ = events.send(BatchEvent::Done { succeeded, failed });

    report
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
