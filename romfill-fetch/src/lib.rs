//! Download engine for romfill: fetches report obligations from an
//! authenticated HTTP origin and runs them as a sequential batch.

pub mod async_util;
pub mod batch;
pub mod client;
pub mod error;
pub mod settings;

pub use async_util::run_with_events;
pub use batch::{AbortReason, BatchEvent, BatchReport, run_batch};
pub use client::{FetchClient, Fetcher, is_too_many_attempts};
pub use error::{FetchError, SettingsError};
pub use settings::{Credentials, JobSettings, SettingSource, SettingSources, Settings};

pub use tokio_util::sync::CancellationToken;
