use std::io::Write;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romfill_fetch::settings::{self, SettingSource};
use romfill_fetch::{Credentials, Settings};

use crate::CliError;

fn mask_value(s: &str) -> String {
    match s.char_indices().nth(2) {
        Some((cut, _)) => format!("{}****", &s[..cut]),
        None => "****".to_string(),
    }
}

/// Show current settings and their sources.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings::settings_path();
    let sources = settings::setting_sources();
    let current = Settings::load();

    log::info!(
        "{}",
        "romfill Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Settings file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    let fields: [(&str, SettingSource, Option<String>); 6] = [
        ("url", sources.origin, current.origin.clone()),
        (
            "username",
            sources.username,
            non_empty(&current.credentials.username).map(str::to_string),
        ),
        (
            "password",
            sources.password,
            non_empty(&current.credentials.password).map(mask_value),
        ),
        ("report", sources.report, path_str(&current.report)),
        ("destination", sources.destination, path_str(&current.destination)),
        (
            "cleanup_report",
            sources.cleanup_report,
            Some(current.cleanup_report.to_string()),
        ),
    ];

    for (name, source, value) in &fields {
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    Ok(())
}

/// An empty stored value offers no default at the prompt.
fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Interactively set up the settings file.
pub(crate) fn run_config_setup() -> Result<(), CliError> {
    println!(
        "{}",
        "romfill Setup".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    // Existing values (file + environment) become the defaults.
    let existing = Settings::load();

    let read_line = |prompt: &str, default: Option<&str>, required: bool| -> Result<Option<String>, CliError> {
        loop {
            match default {
                Some(def) => print!("  {} [{}]: ", prompt, def),
                None => print!("  {}: ", prompt),
            }
            std::io::stdout().flush()?;

            let mut input = String::new();
            if std::io::stdin().read_line(&mut input)? == 0 {
                return Err(CliError::other("Setup aborted (end of input)"));
            }
            let trimmed = input.trim();

            if trimmed.is_empty() {
                if let Some(def) = default {
                    return Ok(Some(def.to_string()));
                }
                if required {
                    println!(
                        "    {}",
                        "This field is required.".if_supports_color(Stdout, |t| t.yellow()),
                    );
                    continue;
                }
                return Ok(None);
            }
            return Ok(Some(trimmed.to_string()));
        }
    };

    let path_default = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    println!(
        "  {}",
        "Origin (required):".if_supports_color(Stdout, |t| t.dimmed()),
    );
    let origin = read_line("url", existing.origin.as_deref(), true)?;
    let username = read_line("username", non_empty(&existing.credentials.username), false)?;
    let password = read_line(
        "password",
        non_empty(&existing.credentials.password).map(|_| "keep current"),
        false,
    )?
    .filter(|p| p != "keep current")
    .unwrap_or_else(|| existing.credentials.password.clone());

    println!();
    println!(
        "  {}",
        "Paths (optional, press Enter to skip):".if_supports_color(Stdout, |t| t.dimmed()),
    );
    let report_default = path_default(&existing.report);
    let dest_default = path_default(&existing.destination);
    let report = read_line("report", report_default.as_deref(), false)?;
    let destination = read_line("destination", dest_default.as_deref(), false)?;

    let updated = Settings {
        origin,
        credentials: Credentials::new(username.unwrap_or_default(), password),
        report: report.map(PathBuf::from),
        destination: destination.map(PathBuf::from),
        cleanup_report: existing.cleanup_report,
    };

    let path = settings::save_to_file(&updated)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;

    println!();
    log::info!(
        "{} Settings saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    let path = settings::settings_path()
        .ok_or_else(|| CliError::config("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_value(""), "****");
        assert_eq!(mask_value("ab"), "****");
        assert_eq!(mask_value("hunter2"), "hu****");
        assert_eq!(mask_value("éèxyz"), "éè****");
    }

    #[test]
    fn empty_values_offer_no_default() {
        let stored = String::from("alice");
        assert_eq!(non_empty(&stored), Some("alice"));
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty(&stored).map(|_| "keep current"), Some("keep current"));
    }
}
