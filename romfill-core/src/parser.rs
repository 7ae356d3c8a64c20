//! Audit report parsing.
//!
//! Turns a report into the ordered list of downloads it implies. Missing
//! lines belong to the nearest preceding set header; ROM and sample archives
//! are requested once per set, disk images once per `missing disk:` line.

use std::collections::HashSet;
use std::path::Path;

use crate::obligation::{DedupKey, Obligation};
use crate::report::{self, ReportLine};

/// Parse a report file.
///
/// Never fails: an unreadable or missing file is logged and yields no
/// obligations.
pub fn parse_report(path: &Path) -> Vec<Obligation> {
    match report::load(path) {
        Ok(text) => {
            let obligations = parse_report_str(&text);
            log::info!(
                "Parsed {} download item(s) from {}",
                obligations.len(),
                path.display()
            );
            obligations
        }
        Err(e) => {
            log::error!("Failed to parse report {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Parse report text already in memory.
pub fn parse_report_str(text: &str) -> Vec<Obligation> {
    text.lines()
        .fold(ParseState::default(), ParseState::feed)
        .obligations
}

#[derive(Default)]
struct ParseState {
    current_set: String,
    seen_archives: HashSet<DedupKey>,
    obligations: Vec<Obligation>,
}

impl ParseState {
    fn feed(mut self, line: &str) -> Self {
        let parsed = report::classify(line);

        if let ReportLine::Header(tag) = parsed {
            self.current_set = tag.to_string();
            return self;
        }

        // Missing entries before any header cannot be attributed to a set.
        if self.current_set.is_empty() {
            return self;
        }

        match parsed {
            ReportLine::MissingRom(Some(name)) if report::has_chd_extension(name) => {
                self.obligations
                    .push(Obligation::disk(&self.current_set, name));
            }
            ReportLine::MissingRom(_) => {
                let archive = Obligation::rom_archive(&self.current_set);
                self.push_archive(archive);
            }
            ReportLine::MissingSample => {
                let archive = Obligation::sample_archive(&self.current_set);
                self.push_archive(archive);
            }
            ReportLine::MissingDisk(Some(file_name)) => {
                self.obligations
                    .push(Obligation::disk(&self.current_set, file_name));
            }
            _ => {}
        }
        self
    }

    /// Queue a set archive unless the same archive is already queued.
    fn push_archive(&mut self, archive: Obligation) {
        if self.seen_archives.insert(archive.dedup_key()) {
            self.obligations.push(archive);
        }
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
