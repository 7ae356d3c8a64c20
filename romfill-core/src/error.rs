use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or rewriting a report file.
///
/// These never cross the public parse/clean functions; they are logged there.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error while reading or writing the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report path does not exist
    #[error("Report file not found: {}", .0.display())]
    NotFound(PathBuf),
}
