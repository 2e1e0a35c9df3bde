//! Human-readable rendering of record fields.

use time::OffsetDateTime;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Size in the largest unit that keeps the value at or above 1, base 1024,
/// with at most two decimals and no trailing zeros.
///
/// ```
/// use gallery_catalog::format::format_file_size;
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = (bytes.ilog(1024) as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exponent])
}

/// Epoch milliseconds as UTC `YYYY-MM-DD HH:MM`. Out-of-range values render
/// as the raw number.
pub fn format_timestamp(millis: i64) -> String {
    let Ok(datetime) = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000) else {
        return millis.to_string();
    };
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        datetime.year(),
        u8::from(datetime.month()),
        datetime.day(),
        datetime.hour(),
        datetime.minute()
    )
}
