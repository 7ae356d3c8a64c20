use super::*;
use crate::parser::parse_report_str;

fn rom(set: &str) -> Obligation {
    Obligation::rom_archive(set)
}

fn sample(set: &str) -> Obligation {
    Obligation::sample_archive(set)
}

#[test]
fn keeps_header_while_sample_remains() {
    let out = rewrite_report("Foo [foo]\nmissing rom:\nmissing sample:\n", &[rom("foo")]);
    assert_eq!(out.text, "Foo [foo]\nmissing sample:\n");
    assert_eq!(out.summary.removed_lines, 1);
    assert_eq!(out.summary.dropped_headers, 0);
}

#[test]
fn drops_section_when_everything_arrived() {
    let out = rewrite_report(
        "Foo [foo]\nmissing rom:\nmissing sample:\n",
        &[rom("foo"), sample("foo")],
    );
    assert_eq!(out.text, "");
    assert_eq!(out.summary.removed_lines, 2);
    assert_eq!(out.summary.dropped_headers, 1);
}

#[test]
fn unrelated_sections_pass_through() {
    let input = "Report header\n\nFoo [foo]\nmissing rom: a [crc]\n\nBar [bar]\nmissing rom: b [crc]\n";
    let out = rewrite_report(input, &[rom("foo")]);
    assert_eq!(out.text, "Report header\n\n\nBar [bar]\nmissing rom: b [crc]\n");
}

#[test]
fn bios_success_clears_rom_lines() {
    let bios = Obligation::new("neogeo", "neogeo.zip", AssetKind::Bios);
    let out = rewrite_report("Neo Geo [neogeo]\nmissing rom: sp-s2.sp1\n", &[bios]);
    assert_eq!(out.text, "");
}

#[test]
fn disk_lines_match_by_normalized_name() {
    let input = "Killer Instinct [kinst]\nmissing disk: kinst [sha1: 81d1]\nmissing disk: kinst2\n";
    let out = rewrite_report(input, &[Obligation::disk("kinst", "kinst.chd")]);
    assert_eq!(out.text, "Killer Instinct [kinst]\nmissing disk: kinst2\n");
}

#[test]
fn chd_in_missing_rom_is_cleared_by_disk_success() {
    let input = "Foo [foo]\nmissing rom: foo.chd\nmissing rom: prog.bin\n";
    let out = rewrite_report(input, &[Obligation::disk("foo", "foo.chd")]);
    assert_eq!(out.text, "Foo [foo]\nmissing rom: prog.bin\n");
}

#[test]
fn informational_lines_survive_dropped_header_in_order() {
    let input = "Foo [foo]\nnote about foo\n\nmissing rom: a\nBar [bar]\nmissing rom: b\n";
    let out = rewrite_report(input, &[rom("foo")]);
    assert_eq!(out.text, "note about foo\n\nBar [bar]\nmissing rom: b\n");
}

#[test]
fn informational_lines_stay_behind_retained_header() {
    let input = "Foo [foo]\nnote about foo\nmissing rom: a\nmissing sample: s\n";
    let out = rewrite_report(input, &[rom("foo")]);
    assert_eq!(out.text, "Foo [foo]\nnote about foo\nmissing sample: s\n");
}

#[test]
fn unknown_missing_lines_keep_header() {
    let input = "Foo [foo]\nmissing rom: a\nmissing machine: parent\n";
    let out = rewrite_report(input, &[rom("foo")]);
    assert_eq!(out.text, "Foo [foo]\nmissing machine: parent\n");
}

#[test]
fn preserves_crlf_and_unterminated_last_line() {
    let input = "Foo [foo]\r\nmissing rom: a\r\nBar [bar]\r\nmissing rom: b";
    let out = rewrite_report(input, &[rom("foo")]);
    assert_eq!(out.text, "Bar [bar]\r\nmissing rom: b");
}

#[test]
fn metadata_annotation_is_passed_through() {
    let input = "Puck Man [puckman]\nPac-Man [cloneof: puckman]\nmissing rom: x\n";
    let out = rewrite_report(input, &[rom("puckman")]);
    assert_eq!(out.text, "Pac-Man [cloneof: puckman]\n");
}

#[test]
fn nothing_succeeded_means_identical_output() {
    let input = "Intro\nFoo [foo]\nmissing rom: a\n\nBar [bar]\nmissing disk: d\n";
    let out = rewrite_report(input, &[]);
    assert_eq!(out.text, input);
    assert!(out.summary.is_empty());
}

#[test]
fn reparse_never_reintroduces_successes() {
    let input = "\
Foo [foo]
missing rom: a
missing rom: foo.chd
missing sample: s
missing disk: d1
Bar [bar]
missing rom: b
missing disk: d2 [sha1: 1]
";
    let before = parse_report_str(input);
    let successes: Vec<Obligation> = before.iter().step_by(2).cloned().collect();
    let out = rewrite_report(input, &successes);
    let after = parse_report_str(&out.text);
    for ok in &successes {
        assert!(!after.contains(ok), "{ok} came back after cleanup");
    }
    for remaining in before.iter().skip(1).step_by(2) {
        assert!(after.contains(remaining), "{remaining} was lost");
    }
}

#[test]
fn clean_report_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    std::fs::write(&path, "Foo [foo]\nmissing rom: a\nBar [bar]\nmissing rom: b\n").unwrap();

    let summary = clean_report(&path, &[rom("foo")]).unwrap();
    assert_eq!(summary.removed_lines, 1);
    assert_eq!(summary.dropped_headers, 1);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Bar [bar]\nmissing rom: b\n"
    );
    assert!(!dir.path().join("missing.txt.tmp").exists());
}

#[test]
fn clean_report_missing_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    assert!(clean_report(&path, &[rom("foo")]).is_none());
    assert!(!path.exists());
}
