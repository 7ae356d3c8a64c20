//! Line classification for audit reports.
//!
//! Reports are free-form text. Only three shapes matter:
//!
//! - set headers, `Title [setname]`
//! - directives, `missing rom: ...`, `missing sample: ...`, `missing disk: ...`
//! - everything else, which is passed through untouched
//!
//! The parser and the cleaner both classify lines through [`classify`], so
//! they always agree on what a line means.

use std::fs;
use std::path::Path;

use crate::error::ReportError;

const MISSING: &str = "missing";
const MISSING_ENTRY: &str = "missing ";
const MISSING_ROM: &str = "missing rom:";
const MISSING_SAMPLE: &str = "missing sample:";
const MISSING_DISK: &str = "missing disk:";
const CHD_EXT: &str = ".chd";

/// Meaning of one report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine<'a> {
    Blank,
    /// `Title [tag]` where the tag holds no `:`.
    Header(&'a str),
    /// `missing rom:` with the entry name, CRC annotation stripped.
    MissingRom(Option<&'a str>),
    MissingSample,
    /// `missing disk:` with the normalized `.chd` file name.
    MissingDisk(Option<String>),
    /// Any other `missing ...` line (e.g. `missing machine: ...`).
    MissingOther,
    Other,
}

impl ReportLine<'_> {
    /// True for every `missing ...` line, recognized or not.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::MissingRom(_) | Self::MissingSample | Self::MissingDisk(_) | Self::MissingOther
        )
    }
}

/// Classify a single line. Surrounding whitespace is ignored.
pub fn classify(line: &str) -> ReportLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReportLine::Blank;
    }

    if let Some(rest) = strip_prefix_ci(trimmed, MISSING_ROM) {
        return ReportLine::MissingRom(entry_name(rest));
    }
    if strip_prefix_ci(trimmed, MISSING_SAMPLE).is_some() {
        return ReportLine::MissingSample;
    }
    if let Some(rest) = strip_prefix_ci(trimmed, MISSING_DISK) {
        return ReportLine::MissingDisk(entry_name(rest).map(disk_file_name));
    }

    if strip_prefix_ci(trimmed, MISSING_ENTRY).is_some() {
        return ReportLine::MissingOther;
    }
    // Never a header, even when it ends in a bracket.
    if strip_prefix_ci(trimmed, MISSING).is_some() {
        return ReportLine::Other;
    }

    match header_tag(trimmed) {
        Some(tag) => ReportLine::Header(tag),
        None => ReportLine::Other,
    }
}

/// Set tag of a header line, or `None` if the line is not a set header.
///
/// The tag is the text inside the last bracket pair closing the line. Tags
/// containing `:` are annotations such as `cloneof: puckman`.
fn header_tag(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let tag = &inner[open + 1..];
    if tag.contains(':') { None } else { Some(tag) }
}

/// Entry name following a directive prefix, cut before any `[...]` annotation.
fn entry_name(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    let name = match rest.find('[') {
        Some(idx) => rest[..idx].trim(),
        None => rest,
    };
    if name.is_empty() { None } else { Some(name) }
}

/// Append `.chd` to a disk name unless it already carries the extension.
pub fn disk_file_name(name: &str) -> String {
    if has_chd_extension(name) {
        name.to_string()
    } else {
        format!("{name}{CHD_EXT}")
    }
}

pub fn has_chd_extension(name: &str) -> bool {
    name.len() >= CHD_EXT.len()
        && name
            .get(name.len() - CHD_EXT.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CHD_EXT))
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Read a report file as UTF-8 text.
pub(crate) fn load(path: &Path) -> Result<String, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
