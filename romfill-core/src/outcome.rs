use std::fmt;

/// Terminal result of fetching one obligation.
///
/// `Unauthorized`, `RateLimited` and `Canceled` stop the whole batch; every
/// other failure only affects its own item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The file was written completely.
    Success,
    /// The origin answered with a non-success status.
    HttpError { status: u16, reason: String },
    /// The origin rejected the credentials.
    Unauthorized,
    /// The origin signalled throttling ("too many attempts" or HTTP 429).
    RateLimited,
    /// The cancellation token fired before the fetch finished.
    Canceled,
    /// Any other item-local failure (transport, disk, unexpected HTML).
    Failed(String),
}

impl Outcome {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether the caller must stop issuing further fetches.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RateLimited | Self::Canceled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpError { status: 404, .. })
    }

    /// Short status for progress listings.
    pub fn label(&self) -> String {
        match self {
            Self::Success => "OK".to_string(),
            Self::HttpError { status: 404, .. } => "Not Found".to_string(),
            Self::HttpError { status: 401, .. } | Self::Unauthorized => "Unauthorized".to_string(),
            Self::HttpError { status: 429, .. } | Self::RateLimited => {
                "Rate limit reached".to_string()
            }
            Self::HttpError { status, reason } => format!("HTTP {status}: {reason}"),
            Self::Canceled => "Canceled".to_string(),
            Self::Failed(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("timed out") || lower.contains("timeout") {
                    "Timeout".to_string()
                } else if msg.trim().is_empty() {
                    "Failed".to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("downloaded"),
            Self::HttpError { status, reason } => write!(f, "HTTP {status}: {reason}"),
            Self::Unauthorized => f.write_str("credentials rejected by server"),
            Self::RateLimited => f.write_str("server reported too many attempts"),
            Self::Canceled => f.write_str("canceled"),
            Self::Failed(msg) => f.write_str(msg),
        }
    }
}
