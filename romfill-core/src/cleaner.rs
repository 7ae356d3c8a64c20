//! Report cleanup after a download batch.
//!
//! Removes the `missing ...` lines satisfied by successful downloads and
//! drops set headers whose section no longer lists anything missing. Every
//! other line, blank lines included, is written back byte-for-byte and in
//! its original order.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::obligation::{AssetKind, Obligation};
use crate::report::{self, ReportLine};

/// Counts of what a cleanup removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// `missing ...` lines removed.
    pub removed_lines: usize,
    /// Set headers removed because their section became empty.
    pub dropped_headers: usize,
}

impl CleanupSummary {
    pub fn is_empty(&self) -> bool {
        self.removed_lines == 0 && self.dropped_headers == 0
    }
}

/// Result of rewriting report text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub summary: CleanupSummary,
}

/// Rewrite a report file in place, removing entries satisfied by `successes`.
///
/// Returns `None` when the file does not exist or could not be rewritten;
/// failures are logged and leave the original file untouched.
pub fn clean_report(path: &Path, successes: &[Obligation]) -> Option<CleanupSummary> {
    if !path.exists() {
        log::debug!("Report {} does not exist, nothing to clean", path.display());
        return None;
    }

    match clean_file(path, successes) {
        Ok(summary) => {
            log::info!(
                "Cleaned up report file {} ({} entr{} removed, {} empty set(s) dropped)",
                path.display(),
                summary.removed_lines,
                if summary.removed_lines == 1 { "y" } else { "ies" },
                summary.dropped_headers,
            );
            Some(summary)
        }
        Err(e) => {
            log::error!("Failed to clean up report file {}: {}", path.display(), e);
            None
        }
    }
}

fn clean_file(path: &Path, successes: &[Obligation]) -> Result<CleanupSummary, ReportError> {
    let text = report::load(path)?;
    let rewrite = rewrite_report(&text, successes);
    if rewrite.summary.is_empty() {
        return Ok(rewrite.summary);
    }

    // Write atomically so a failure never leaves a truncated report.
    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, &rewrite.text).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(rewrite.summary)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Rewrite report text, removing entries satisfied by `successes`.
pub fn rewrite_report(text: &str, successes: &[Obligation]) -> Rewrite {
    let satisfied = Satisfied::from_successes(successes);
    text.split_inclusive('\n')
        .fold(Cleaner::new(&satisfied, text.len()), Cleaner::feed)
        .finish()
}

/// Membership sets built from the successful downloads.
struct Satisfied<'a> {
    /// Sets whose ROM archive arrived, from either `currentroms` or `bios`.
    roms: HashSet<&'a str>,
    samples: HashSet<&'a str>,
    /// Disk images by exact file name.
    chds: HashSet<&'a str>,
}

impl<'a> Satisfied<'a> {
    fn from_successes(successes: &'a [Obligation]) -> Self {
        let mut satisfied = Self {
            roms: HashSet::new(),
            samples: HashSet::new(),
            chds: HashSet::new(),
        };
        for item in successes {
            match item.kind() {
                AssetKind::Rom | AssetKind::Bios => {
                    satisfied.roms.insert(item.set_name());
                }
                AssetKind::Sample => {
                    satisfied.samples.insert(item.set_name());
                }
                AssetKind::Chd => {
                    satisfied.chds.insert(item.file_name());
                }
            }
        }
        satisfied
    }

    fn covers(&self, line: &ReportLine<'_>, current_set: &str) -> bool {
        match line {
            // A `missing rom:` naming a disk image was fetched as a CHD.
            ReportLine::MissingRom(Some(name)) if report::has_chd_extension(name) => {
                self.chds.contains(name)
            }
            ReportLine::MissingRom(_) => self.roms.contains(current_set),
            ReportLine::MissingSample => self.samples.contains(current_set),
            ReportLine::MissingDisk(Some(name)) => self.chds.contains(name.as_str()),
            _ => false,
        }
    }
}

/// A header held back until we know its section still lists something.
struct PendingSection<'a> {
    header: &'a str,
    /// Non-missing lines seen after the header, kept in order.
    held: Vec<&'a str>,
}

struct Cleaner<'s, 'a> {
    satisfied: &'s Satisfied<'s>,
    current_set: &'a str,
    pending: Option<PendingSection<'a>>,
    out: String,
    summary: CleanupSummary,
}

impl<'s, 'a> Cleaner<'s, 'a> {
    fn new(satisfied: &'s Satisfied<'s>, capacity: usize) -> Self {
        Self {
            satisfied,
            current_set: "",
            pending: None,
            out: String::with_capacity(capacity),
            summary: CleanupSummary::default(),
        }
    }

    fn feed(mut self, raw: &'a str) -> Self {
        let line = report::classify(raw);

        if let ReportLine::Header(tag) = line {
            self.flush_pending();
            self.current_set = tag;
            self.pending = Some(PendingSection {
                header: raw,
                held: Vec::new(),
            });
            return self;
        }

        if self.satisfied.covers(&line, self.current_set) {
            self.summary.removed_lines += 1;
            return self;
        }

        if line.is_missing() {
            // The section still lists something: its header stays.
            if let Some(section) = self.pending.take() {
                self.out.push_str(section.header);
                section.held.iter().for_each(|l| self.out.push_str(l));
            }
            self.out.push_str(raw);
        } else if let Some(section) = self.pending.as_mut() {
            section.held.push(raw);
        } else {
            self.out.push_str(raw);
        }
        self
    }

    /// Emit a still-pending section. Its header is dropped because nothing
    /// missing followed it; the held lines are kept.
    fn flush_pending(&mut self) {
        if let Some(section) = self.pending.take() {
            self.summary.dropped_headers += 1;
            section.held.iter().for_each(|l| self.out.push_str(l));
        }
    }

    fn finish(mut self) -> Rewrite {
        self.flush_pending();
        Rewrite {
            text: self.out,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
#[path = "tests/cleaner_tests.rs"]
mod tests;
