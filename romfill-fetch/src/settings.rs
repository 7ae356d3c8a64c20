//! Origin, credential and path settings.
//!
//! Values come from, in priority order: CLI overrides, `ROMFILL_*`
//! environment variables, `~/.config/romfill/settings.toml`, defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

pub const ENV_URL: &str = "ROMFILL_URL";
pub const ENV_USERNAME: &str = "ROMFILL_USERNAME";
pub const ENV_PASSWORD: &str = "ROMFILL_PASSWORD";
pub const ENV_REPORT: &str = "ROMFILL_REPORT";
pub const ENV_DESTINATION: &str = "ROMFILL_DESTINATION";
pub const ENV_CLEANUP: &str = "ROMFILL_CLEANUP";

/// Basic-auth credentials for the origin.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Resolved settings. Any field may still be unset.
#[derive(Debug, Clone)]
pub struct Settings {
    pub origin: Option<String>,
    pub credentials: Credentials,
    pub report: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    /// Rewrite the report after downloading (default on).
    pub cleanup_report: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: None,
            credentials: Credentials::default(),
            report: None,
            destination: None,
            cleanup_report: true,
        }
    }
}

/// Settings validated for a download run.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub origin: String,
    pub credentials: Credentials,
    pub report: PathBuf,
    pub destination: PathBuf,
    pub cleanup_report: bool,
}

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the settings file.
    SettingsFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::SettingsFile => write!(f, "settings file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug, Clone)]
pub struct SettingSources {
    pub origin: SettingSource,
    pub username: SettingSource,
    pub password: SettingSource,
    pub report: SettingSource,
    pub destination: SettingSource,
    pub cleanup_report: SettingSource,
}

/// TOML settings file format.
#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    cleanup_report: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<OriginSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<PathsSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OriginSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PathsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<PathBuf>,
}

/// Canonical path to the settings file: `~/.config/romfill/settings.toml`.
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("romfill").join("settings.toml"))
}

impl Settings {
    /// Load settings from the environment and the settings file.
    pub fn load() -> Self {
        let file = settings_path().and_then(|p| load_file(&p));
        resolve(file, env_var).0
    }

    /// Load settings from an explicit file, ignoring the environment.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let file: SettingsFile = toml::from_str(&content)?;
        Ok(resolve(Some(file), |_| None).0)
    }

    /// Apply explicit values (e.g., from CLI args) on top of loaded settings.
    pub fn with_overrides(
        mut self,
        origin: Option<String>,
        username: Option<String>,
        password: Option<String>,
        report: Option<PathBuf>,
        destination: Option<PathBuf>,
        cleanup_report: Option<bool>,
    ) -> Self {
        if let Some(url) = origin {
            self.origin = Some(url);
        }
        if let Some(name) = username {
            self.credentials.username = name;
        }
        if let Some(pw) = password {
            self.credentials.password = pw;
        }
        if let Some(p) = report {
            self.report = Some(p);
        }
        if let Some(p) = destination {
            self.destination = Some(p);
        }
        if let Some(c) = cleanup_report {
            self.cleanup_report = c;
        }
        self
    }

    /// Check that everything a download run needs is present.
    pub fn into_job(self) -> Result<JobSettings, SettingsError> {
        let origin = self
            .origin
            .filter(|s| !s.trim().is_empty())
            .ok_or(SettingsError::Missing("origin URL"))?;
        let report = self
            .report
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(SettingsError::Missing("report file"))?;
        let destination = self
            .destination
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(SettingsError::Missing("destination folder"))?;

        Ok(JobSettings {
            origin,
            credentials: self.credentials,
            report,
            destination,
            cleanup_report: self.cleanup_report,
        })
    }
}

/// Save settings to the settings file, creating parent directories as needed.
///
/// Returns the path the file was written to.
pub fn save_to_file(settings: &Settings) -> Result<PathBuf, SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    save_to(&path, settings)?;
    Ok(path)
}

/// Save settings to an explicit path, atomically.
pub fn save_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let file = SettingsFile {
        cleanup_report: Some(settings.cleanup_report),
        origin: Some(OriginSection {
            url: settings.origin.clone(),
            username: non_empty(&settings.credentials.username),
            password: non_empty(&settings.credentials.password),
        }),
        paths: Some(PathsSection {
            report: settings.report.clone(),
            destination: settings.destination.clone(),
        }),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&file)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Determine where each setting is coming from.
pub fn setting_sources() -> SettingSources {
    let file = settings_path().and_then(|p| load_file(&p));
    resolve(file, env_var).1
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn load_file(path: &Path) -> Option<SettingsFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
            None
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Pick one value: environment first, then the settings file.
fn pick<T>(
    env_key: &'static str,
    from_env: Option<T>,
    from_file: Option<T>,
) -> (Option<T>, SettingSource) {
    match (from_env, from_file) {
        (Some(v), _) => (Some(v), SettingSource::EnvVar(env_key)),
        (None, Some(v)) => (Some(v), SettingSource::SettingsFile),
        (None, None) => (None, SettingSource::Missing),
    }
}

/// Merge the settings file with environment lookups.
fn resolve(
    file: Option<SettingsFile>,
    env: impl Fn(&str) -> Option<String>,
) -> (Settings, SettingSources) {
    let file = file.unwrap_or_default();
    let origin_section = file.origin.unwrap_or_default();
    let paths = file.paths.unwrap_or_default();

    let (origin, origin_src) = pick(ENV_URL, env(ENV_URL), origin_section.url);
    let (username, username_src) = pick(ENV_USERNAME, env(ENV_USERNAME), origin_section.username);
    let (password, password_src) = pick(ENV_PASSWORD, env(ENV_PASSWORD), origin_section.password);
    let (report, report_src) = pick(ENV_REPORT, env(ENV_REPORT).map(PathBuf::from), paths.report);
    let (destination, destination_src) = pick(
        ENV_DESTINATION,
        env(ENV_DESTINATION).map(PathBuf::from),
        paths.destination,
    );
    let (cleanup, cleanup_src) = match pick(
        ENV_CLEANUP,
        env(ENV_CLEANUP).and_then(|v| parse_bool(&v)),
        file.cleanup_report,
    ) {
        (None, _) => (true, SettingSource::Default),
        (Some(c), src) => (c, src),
    };

    let settings = Settings {
        origin,
        credentials: Credentials {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
        },
        report,
        destination,
        cleanup_report: cleanup,
    };
    let sources = SettingSources {
        origin: origin_src,
        username: username_src,
        password: password_src,
        report: report_src,
        destination: destination_src,
        cleanup_report: cleanup_src,
    };
    (settings, sources)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
