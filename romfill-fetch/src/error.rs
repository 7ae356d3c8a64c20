/// Errors that can occur while fetching a single file.
///
/// These stay inside the engine: [`crate::FetchClient::fetch`] maps every
/// variant to an [`romfill_core::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Received unexpected HTML content instead of binary file. Response preview: {preview}")]
    UnexpectedHtml { preview: String },

    #[error("Server reported too many attempts")]
    RateLimited,

    #[error("Credentials rejected by server")]
    Unauthorized,

    #[error("Download canceled")]
    Canceled,
}

impl FetchError {
    pub fn invalid_origin(msg: impl Into<String>) -> Self {
        Self::InvalidOrigin(msg.into())
    }

    /// Failures worth a second try at the `bios` folder: the origin answered
    /// (or failed to answer) in a way that says nothing about throttling,
    /// credentials or cancellation.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::UnexpectedHtml { .. }
        )
    }
}

/// Errors that can occur while loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}
