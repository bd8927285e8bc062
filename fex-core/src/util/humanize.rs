//! src/util/humanize.rs

/// Marker shown in place of a size for directories.
pub const DIRECTORY_MARKER: &str = "[D]";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with two decimals in the largest unit (up to TB)
/// that keeps the value below 1024.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "display only")]
pub fn format_size(size: u64) -> String {
    let mut size_f: f64 = size as f64;
    let mut unit_idx: usize = 0;

    while size_f >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size_f /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size_f, UNITS[unit_idx])
}
