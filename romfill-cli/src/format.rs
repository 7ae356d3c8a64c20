//! Human-readable byte counts and transfer rates.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count, e.g. `512 B`, `1.5 KB`, `3.25 MB`.
///
/// Bytes have no decimals, kilobytes one, everything larger two.
pub(crate) fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    match unit {
        0 => format!("{} {}", bytes, UNITS[0]),
        1 => format!("{:.1} {}", value, UNITS[1]),
        _ => format!("{:.2} {}", value, UNITS[unit]),
    }
}

/// Format a transfer rate, or an empty string when not measured yet.
pub(crate) fn format_rate(bytes_per_second: Option<f64>) -> String {
    match bytes_per_second {
        Some(rate) if rate.is_finite() && rate >= 0.0 => {
            format!("{}/s", format_bytes(rate.round() as u64))
        }
        _ => String::new(),
    }
}

/// `received / total` when the total is known, else just `received`.
pub(crate) fn format_progress(received: u64, total: Option<u64>) -> String {
    match total {
        Some(total) => format!("{} / {}", format_bytes(received), format_bytes(total)),
        None => format_bytes(received),
    }
}
