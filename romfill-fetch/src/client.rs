use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use reqwest::{StatusCode, Url, header};
use romfill_core::{AssetKind, Obligation, Outcome, ProgressSample, ProgressSink};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::settings::Credentials;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_BUFFER: usize = 128 * 1024;
const RATE_WINDOW: Duration = Duration::from_millis(250);
const PREVIEW_CHARS: usize = 200;
const TOO_MANY_ATTEMPTS: &str = "too many attempts";

/// Something that can satisfy one obligation.
///
/// Implemented by [`FetchClient`]; the batch runner is generic over it.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(
        &self,
        obligation: &Obligation,
        dest: &Path,
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Outcome;
}

/// HTTP client for one origin, authenticating every request with Basic auth.
pub struct FetchClient {
    http: reqwest::Client,
    origin: Url,
    creds: Credentials,
}

impl FetchClient {
    /// Build a client for `origin`. A trailing `/` is added when missing.
    pub fn new(origin: &str, creds: Credentials) -> Result<Self, FetchError> {
        let mut url = Url::parse(origin.trim())
            .map_err(|e| FetchError::invalid_origin(format!("{origin}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(FetchError::invalid_origin(origin));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .user_agent(concat!("romfill/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            origin: url,
            creds,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Full URL of an obligation on the origin, with each segment percent-encoded.
    pub fn url_for(&self, obligation: &Obligation) -> Url {
        let mut url = self.origin.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(obligation.remote_segments());
        }
        url
    }

    /// Download one obligation below `dest`, falling back to the `bios`
    /// folder once for ROM archives the origin does not serve.
    pub async fn fetch(
        &self,
        obligation: &Obligation,
        dest: &Path,
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Outcome {
        let err = match self.try_download(obligation, dest, cancel, progress).await {
            Ok(()) => return Outcome::Success,
            Err(e) => e,
        };

        if obligation.kind() != AssetKind::Rom || !err.allows_fallback() {
            return failure(obligation, err);
        }

        let bios = Obligation::new(obligation.set_name(), obligation.file_name(), AssetKind::Bios);
        log::warn!(
            "{} failed ({}), retrying as {}",
            obligation.remote_path(),
            err,
            bios.remote_path()
        );
        match self.try_download(&bios, dest, cancel, progress).await {
            Ok(()) => Outcome::Success,
            Err(e) => failure(&bios, e),
        }
    }

    async fn try_download(
        &self,
        obligation: &Obligation,
        dest: &Path,
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Canceled);
        }

        let folder = local_folder(dest, obligation);
        tokio::fs::create_dir_all(&folder).await?;

        let url = self.url_for(obligation);
        log::info!("Downloading {} to {}", url, folder.display());

        let request = self
            .http
            .get(url)
            .basic_auth(&self.creds.username, Some(&self.creds.password))
            .send();
        let mut response = until_cancelled(cancel, request).await?;

        let status = response.status();
        let reason = reason_phrase(&response);

        if is_html(&response) {
            let body = until_cancelled(cancel, response.text()).await?;
            if is_too_many_attempts(status, &reason, &body) {
                return Err(FetchError::RateLimited);
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(FetchError::Unauthorized);
            }
            return Err(FetchError::UnexpectedHtml {
                preview: preview(&body),
            });
        }

        if !status.is_success() {
            let body = match until_cancelled(cancel, response.text()).await {
                Ok(body) => body,
                Err(FetchError::Canceled) => return Err(FetchError::Canceled),
                Err(e) => {
                    log::debug!("Could not read error body for {}: {}", obligation, e);
                    String::new()
                }
            };
            if is_too_many_attempts(status, &reason, &body) {
                return Err(FetchError::RateLimited);
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(FetchError::Unauthorized);
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let path = folder.join(obligation.file_name());
        let file = tokio::fs::File::create(&path).await?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);

        let streamed = stream_body(
            &mut response,
            &mut writer,
            obligation.file_name(),
            cancel,
            progress,
        )
        .await;
        // Partial data stays on disk when canceled.
        writer.flush().await?;
        let bytes = streamed?;

        log::debug!("Wrote {} bytes to {}", bytes, path.display());
        Ok(())
    }
}

impl Fetcher for FetchClient {
    async fn fetch(
        &self,
        obligation: &Obligation,
        dest: &Path,
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Outcome {
        FetchClient::fetch(self, obligation, dest, cancel, progress).await
    }
}

async fn stream_body(
    response: &mut reqwest::Response,
    writer: &mut BufWriter<tokio::fs::File>,
    file_name: &str,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressSink>,
) -> Result<u64, FetchError> {
    let total = response.content_length();
    let mut meter = RateMeter::new(Instant::now());
    let mut received: u64 = 0;

    let emit = |received: u64, rate: Option<f64>| {
        if let Some(sink) = progress {
            sink.report(ProgressSample {
                file_name: file_name.to_string(),
                total_bytes: total,
                bytes_received: received,
                bytes_per_second: rate,
            });
        }
    };

    emit(0, None);
    while let Some(chunk) = until_cancelled(cancel, response.chunk()).await? {
        writer.write_all(&chunk).await?;
        received += chunk.len() as u64;
        let rate = meter.update(Instant::now(), received);
        emit(received, rate);
    }
    emit(received, meter.average(Instant::now(), received));

    Ok(received)
}

/// Race a network future against cancellation.
async fn until_cancelled<T, E>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, FetchError>
where
    FetchError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Canceled),
        r = fut => r.map_err(FetchError::from),
    }
}

/// Map an engine error to the outcome reported for the item, logging it.
fn failure(obligation: &Obligation, err: FetchError) -> Outcome {
    match err {
        FetchError::RateLimited => {
            log::error!("Rate limit reached while downloading {}", obligation);
            Outcome::RateLimited
        }
        FetchError::Unauthorized => {
            log::error!("Credentials rejected while downloading {}", obligation);
            Outcome::Unauthorized
        }
        FetchError::Canceled => {
            log::info!("Download of {} canceled", obligation);
            Outcome::Canceled
        }
        FetchError::Status { status, reason } => {
            log::error!("Failed to download {}: HTTP {} {}", obligation, status, reason);
            Outcome::HttpError { status, reason }
        }
        FetchError::Http(e) if e.is_timeout() => {
            log::error!("Failed to download {}: {}", obligation, e);
            Outcome::failed(format!("request timed out: {e}"))
        }
        other => {
            log::error!("Failed to download {}: {}", obligation, other);
            Outcome::failed(other.to_string())
        }
    }
}

fn local_folder(dest: &Path, obligation: &Obligation) -> PathBuf {
    obligation
        .local_folder()
        .into_iter()
        .fold(dest.to_path_buf(), |path, segment| path.join(segment))
}

/// Whether a response means the origin is throttling us.
///
/// Any one of: status 429, or "too many attempts" (ASCII case-insensitive)
/// in the reason phrase or the body.
pub fn is_too_many_attempts(status: StatusCode, reason: &str, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || contains_ignore_ascii_case(reason, TOO_MANY_ATTEMPTS)
        || contains_ignore_ascii_case(body, TOO_MANY_ATTEMPTS)
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}

/// The reason phrase the server actually sent, else the canonical one.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
        .or_else(|| response.status().canonical_reason().map(str::to_string))
        .unwrap_or_default()
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_html_media_type)
}

fn is_html_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("text/html"))
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

/// Transfer rate over windows of at least [`RATE_WINDOW`].
///
/// Between windows the previous rate is carried forward.
struct RateMeter {
    started: Instant,
    window_start: Instant,
    window_bytes: u64,
    rate: Option<f64>,
}

impl RateMeter {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            window_start: now,
            window_bytes: 0,
            rate: None,
        }
    }

    fn update(&mut self, now: Instant, total: u64) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= RATE_WINDOW {
            let bytes = total.saturating_sub(self.window_bytes);
            self.rate = Some(bytes as f64 / elapsed.as_secs_f64());
            self.window_start = now;
            self.window_bytes = total;
        }
        self.rate
    }

    /// Lifetime average, or the last window rate for instant transfers.
    fn average(&self, now: Instant, total: u64) -> Option<f64> {
        let secs = now.saturating_duration_since(self.started).as_secs_f64();
        if secs > 0.0 {
            Some(total as f64 / secs)
        } else {
            self.rate
        }
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
