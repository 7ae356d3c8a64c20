use super::*;

#[test]
fn too_many_attempts_triggers() {
    assert!(is_too_many_attempts(StatusCode::TOO_MANY_REQUESTS, "", ""));
    assert!(is_too_many_attempts(StatusCode::FORBIDDEN, "Too Many Attempts", ""));
    assert!(is_too_many_attempts(
        StatusCode::OK,
        "OK",
        "<html>Sorry, TOO MANY ATTEMPTS from your address</html>"
    ));
    assert!(!is_too_many_attempts(StatusCode::NOT_FOUND, "Not Found", "no such file"));
    assert!(!is_too_many_attempts(StatusCode::OK, "OK", "too many requests"));
}

#[test]
fn html_media_type_detection() {
    assert!(is_html_media_type("text/html"));
    assert!(is_html_media_type("Text/HTML; charset=utf-8"));
    assert!(!is_html_media_type("application/zip"));
    assert!(!is_html_media_type("application/xhtml+xml"));
    assert!(!is_html_media_type(""));
}

#[test]
fn preview_is_char_bounded() {
    let body = "é".repeat(300);
    let p = preview(&body);
    assert_eq!(p.chars().count(), 200);
    assert_eq!(preview("short"), "short");
}

#[test]
fn origin_gets_trailing_slash() {
    let client = FetchClient::new("https://example.com/roms", Credentials::default()).unwrap();
    assert_eq!(client.origin().as_str(), "https://example.com/roms/");

    let client = FetchClient::new("https://example.com/", Credentials::default()).unwrap();
    assert_eq!(client.origin().as_str(), "https://example.com/");
}

#[test]
fn invalid_origin_is_rejected() {
    assert!(matches!(
        FetchClient::new("not a url", Credentials::default()),
        Err(FetchError::InvalidOrigin(_))
    ));
    assert!(matches!(
        FetchClient::new("mailto:someone@example.com", Credentials::default()),
        Err(FetchError::InvalidOrigin(_))
    ));
}

#[test]
fn urls_by_kind() {
    let client = FetchClient::new("https://example.com/mame/", Credentials::default()).unwrap();
    assert_eq!(
        client.url_for(&Obligation::rom_archive("pacman")).as_str(),
        "https://example.com/mame/currentroms/pacman.zip"
    );
    assert_eq!(
        client.url_for(&Obligation::disk("kinst", "kinst.chd")).as_str(),
        "https://example.com/mame/CHDs/kinst/kinst.chd"
    );
    assert_eq!(
        client.url_for(&Obligation::disk("my set", "a b.chd")).as_str(),
        "https://example.com/mame/CHDs/my%20set/a%20b.chd"
    );
}

#[test]
fn local_folder_by_kind() {
    let dest = Path::new("/data");
    assert_eq!(
        local_folder(dest, &Obligation::sample_archive("galaxian")),
        Path::new("/data/samples")
    );
    assert_eq!(
        local_folder(dest, &Obligation::disk("kinst", "kinst.chd")),
        Path::new("/data/CHDs/kinst")
    );
}

#[test]
fn rate_meter_windows() {
    let t0 = Instant::now();
    let mut meter = RateMeter::new(t0);

    assert_eq!(meter.update(t0 + Duration::from_millis(100), 1000), None);

    let rate = meter.update(t0 + Duration::from_millis(500), 5000).unwrap();
    assert!((rate - 10_000.0).abs() < 1.0);

    // Inside the next window the previous rate is carried.
    assert_eq!(meter.update(t0 + Duration::from_millis(600), 9000), Some(rate));

    let rate = meter.update(t0 + Duration::from_millis(1000), 10_000).unwrap();
    assert!((rate - 10_000.0).abs() < 1.0);

    let avg = meter.average(t0 + Duration::from_secs(2), 10_000).unwrap();
    assert!((avg - 5_000.0).abs() < 1.0);
}

#[test]
fn rate_meter_average_of_instant_transfer() {
    let t0 = Instant::now();
    let meter = RateMeter::new(t0);
    assert_eq!(meter.average(t0, 42), None);
}

#[test]
fn failure_mapping() {
    let ob = Obligation::rom_archive("foo");
    assert_eq!(failure(&ob, FetchError::RateLimited), Outcome::RateLimited);
    assert_eq!(failure(&ob, FetchError::Unauthorized), Outcome::Unauthorized);
    assert_eq!(failure(&ob, FetchError::Canceled), Outcome::Canceled);
    assert_eq!(
        failure(
            &ob,
            FetchError::Status {
                status: 503,
                reason: "Service Unavailable".into()
            }
        ),
        Outcome::HttpError {
            status: 503,
            reason: "Service Unavailable".into()
        }
    );
    let html = failure(
        &ob,
        FetchError::UnexpectedHtml {
            preview: "<html>".into(),
        },
    );
    assert!(html.label().starts_with("Received unexpected HTML content"));
}
