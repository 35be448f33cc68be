/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use attribution_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    // "-0.00" reads badly; only keep the sign when something non-zero remains.
    if value < 0.0 && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use attribution_core::formatting::format_count;
///
/// assert_eq!(format_count(13304), "13,304");
/// assert_eq!(format_count(7), "7");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a 0–100 percentage the way a pie-chart label shows it (`12.3%`).
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Insert `,` every three digits from the right of a plain digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a horizontal bar proportional to `value / max`, at most `width`
/// characters wide. Used for the text histograms.
pub fn format_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_rounding() {
        assert_eq!(format_number(10.55, 1), "10.6");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(5.0, 0), "5");
    }

    #[test]
    fn test_format_number_negative_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(10.0, 10.0, 20).chars().count(), 20);
        assert_eq!(format_bar(5.0, 10.0, 20).chars().count(), 10);
        // Tiny non-zero values still get one cell.
        assert_eq!(format_bar(0.01, 10.0, 20).chars().count(), 1);
        assert_eq!(format_bar(0.0, 10.0, 20), "");
        assert_eq!(format_bar(3.0, 0.0, 20), "");
    }
}
