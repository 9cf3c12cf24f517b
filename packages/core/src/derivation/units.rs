//! Unit scaling and number formatting.

/// Placeholder for values the node did not report.
pub const NOT_AVAILABLE: &str = "N/A";

const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const HASHRATE_UNITS: [&str; 6] = ["H/s", "KH/s", "MH/s", "GH/s", "TH/s", "PH/s"];

/// Progress at or above this reads as fully synced.
pub const SYNCED_THRESHOLD: f64 = 0.99999;

/// Fixed-point with `,` thousands separators, e.g. `1,234.50`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format_number(0.0, decimals);
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = group_thousands(int_part);
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = grouped.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// Whole number with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Scale by 1024 into Bytes/KB/MB/GB, two decimals. GB is the ceiling.
pub fn format_bytes(bytes: Option<f64>) -> String {
    let (value, unit) = scale(bytes.unwrap_or(0.0), 1024.0, &BYTE_UNITS);
    format!("{} {}", format_number(value, 2), unit)
}

/// Scale by 1000 from H/s up to PH/s, two decimals. PH/s is the ceiling,
/// larger rates are shown as thousands of PH/s.
pub fn format_hashrate(rate: Option<f64>) -> String {
    let (value, unit) = scale(rate.unwrap_or(0.0), 1000.0, &HASHRATE_UNITS);
    format!("{} {}", format_number(value, 2), unit)
}

fn scale(raw: f64, step: f64, units: &[&'static str]) -> (f64, &'static str) {
    if !raw.is_finite() || raw <= 0.0 {
        return (0.0, units[0]);
    }

    let mut value = raw;
    let mut idx = 0;
    while value >= step && idx < units.len() - 1 {
        value /= step;
        idx += 1;
    }
    (value, units[idx])
}

/// `verificationprogress` as a whole percentage.
pub fn sync_progress(progress: Option<f64>) -> String {
    let progress = progress.filter(|p| p.is_finite()).unwrap_or(0.0);
    if progress >= SYNCED_THRESHOLD {
        "100%".to_string()
    } else {
        format!("{}%", (progress * 100.0).round() as i64)
    }
}

/// Decimal gigabytes with two decimals, as nodes report disk usage.
pub fn format_gigabytes(bytes: Option<f64>) -> String {
    format!("{} GB", format_number(bytes.unwrap_or(0.0) / 1_000_000_000.0, 2))
}

pub fn yes_no(flag: bool) -> String {
    let label = if flag { "Yes" } else { "No" };
    label.to_string()
}
