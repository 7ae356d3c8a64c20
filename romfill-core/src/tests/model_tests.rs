use std::sync::Mutex;

use super::*;

#[test]
fn remote_and_local_paths_by_kind() {
    let rom = Obligation::rom_archive("pacman");
    assert_eq!(rom.remote_path(), "currentroms/pacman.zip");
    assert_eq!(rom.local_folder(), vec!["currentroms"]);

    let bios = Obligation::new("neogeo", "neogeo.zip", AssetKind::Bios);
    assert_eq!(bios.remote_path(), "bios/neogeo.zip");
    assert_eq!(bios.local_folder(), vec!["bios"]);

    let sample = Obligation::sample_archive("galaxian");
    assert_eq!(sample.remote_path(), "samples/galaxian.zip");
    assert_eq!(sample.local_folder(), vec!["samples"]);

    let chd = Obligation::disk("kinst", "kinst.chd");
    assert_eq!(chd.remote_path(), "CHDs/kinst/kinst.chd");
    assert_eq!(chd.local_folder(), vec!["CHDs", "kinst"]);
}

#[test]
fn dedup_identity() {
    assert_eq!(
        Obligation::rom_archive("foo").dedup_key(),
        DedupKey::Set("foo".to_string(), AssetKind::Rom)
    );
    assert_ne!(
        Obligation::rom_archive("foo").dedup_key(),
        Obligation::sample_archive("foo").dedup_key()
    );
    assert_eq!(
        Obligation::disk("a", "x.chd").dedup_key(),
        Obligation::disk("b", "x.chd").dedup_key()
    );
}

#[test]
fn asset_kind_parsing() {
    assert_eq!("rom".parse::<AssetKind>().unwrap(), AssetKind::Rom);
    assert_eq!("CHDs".parse::<AssetKind>().unwrap(), AssetKind::Chd);
    assert_eq!(" samples ".parse::<AssetKind>().unwrap(), AssetKind::Sample);
    assert!("cartridge".parse::<AssetKind>().is_err());
    for kind in AssetKind::all() {
        assert_eq!(kind.short_name().parse::<AssetKind>().unwrap(), *kind);
    }
}

#[test]
fn only_auth_rate_limit_and_cancel_abort() {
    assert!(Outcome::Unauthorized.aborts_batch());
    assert!(Outcome::RateLimited.aborts_batch());
    assert!(Outcome::Canceled.aborts_batch());
    assert!(!Outcome::Success.aborts_batch());
    assert!(!Outcome::failed("boom").aborts_batch());
    assert!(
        !Outcome::HttpError {
            status: 500,
            reason: "Internal Server Error".into()
        }
        .aborts_batch()
    );
}

#[test]
fn outcome_labels() {
    let not_found = Outcome::HttpError {
        status: 404,
        reason: "Not Found".into(),
    };
    assert!(not_found.is_not_found());
    assert_eq!(not_found.label(), "Not Found");
    assert_eq!(Outcome::Success.label(), "OK");
    assert_eq!(Outcome::RateLimited.label(), "Rate limit reached");
    assert_eq!(Outcome::failed("operation timed out").label(), "Timeout");
    assert_eq!(Outcome::failed("").label(), "Failed");
    assert_eq!(
        Outcome::HttpError {
            status: 503,
            reason: "Service Unavailable".into()
        }
        .label(),
        "HTTP 503: Service Unavailable"
    );
}

#[test]
fn progress_percent() {
    let mut sample = ProgressSample::started("a.zip", Some(200));
    assert_eq!(sample.percent(), Some(0.0));
    sample.bytes_received = 50;
    assert_eq!(sample.percent(), Some(25.0));
    assert_eq!(ProgressSample::started("a.zip", None).percent(), None);
    assert_eq!(ProgressSample::started("a.zip", Some(0)).percent(), None);
}

#[test]
fn closures_are_progress_sinks() {
    let seen = Mutex::new(Vec::new());
    let sink = |s: ProgressSample| seen.lock().unwrap().push(s.bytes_received);
    let dyn_sink: &dyn ProgressSink = &sink;
    dyn_sink.report(ProgressSample::started("a", None));
    assert_eq!(*seen.lock().unwrap(), vec![0]);
}
