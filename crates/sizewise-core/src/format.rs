//! Human-readable size formatting.

/// Format a byte count with binary units (KiB, MiB, ...).
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Share of `part` in `total` as a percentage (0.0 when `total` is zero).
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Skipped bytes as a percentage of everything seen (`scanned + skipped`).
pub fn skipped_percent(scanned: u64, skipped: u64) -> f64 {
    percent_of(skipped, scanned.saturating_add(skipped))
}
