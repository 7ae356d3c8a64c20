//! Report model for romfill: what an audit report asks for, how a single
//! download ended, and how the report is rewritten afterwards.

pub mod cleaner;
pub mod error;
pub mod obligation;
pub mod outcome;
pub mod parser;
pub mod progress;
pub mod report;

pub use cleaner::{CleanupSummary, Rewrite, clean_report, rewrite_report};
pub use error::ReportError;
pub use obligation::{AssetKind, AssetKindParseError, DedupKey, Obligation};
pub use outcome::Outcome;
pub use parser::{parse_report, parse_report_str};
pub use progress::{ProgressSample, ProgressSink};

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
