//! Label formatting helpers.
//!
//! Used for value labels and continuous legend breaks.

use chrono::NaiveDate;

/// Format a number rounded to `accuracy` with thousands separators.
///
/// `accuracy` is the smallest step to show (`1.0`, `0.1`, `0.01`, ...);
/// `None` picks a sensible default for the magnitude.
#[must_use]
pub fn number(x: f64, accuracy: Option<f64>) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    let accuracy = accuracy.unwrap_or_else(|| default_accuracy(x));
    let decimals = decimals_for(accuracy);
    let rounded = (x / accuracy).round() * accuracy;
    group_thousands(&format!("{rounded:.decimals$}"))
}

/// Format with thousands separators and no decimals.
#[must_use]
pub fn comma(x: f64) -> String {
    number(x, Some(1.0))
}

/// Format a proportion as a percentage (`0.253` → `25%`).
#[must_use]
pub fn percent(x: f64, accuracy: Option<f64>) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    format!("{}%", number(x * 100.0, Some(accuracy.unwrap_or(1.0))))
}

/// Format as currency with two decimals (`-1234.5` → `-$1,234.50`).
#[must_use]
pub fn currency(x: f64, symbol: &str) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    let body = number(x.abs(), Some(0.01));
    if x < 0.0 {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

/// Format with a magnitude suffix (`1200` → `1.2K`, `3_400_000` → `3.4M`).
#[must_use]
pub fn compact(x: f64) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let magnitude = x.abs();
    for (scale, suffix) in SUFFIXES {
        if magnitude >= scale {
            let scaled = x / scale;
            let text = format!("{scaled:.1}");
            let text = text.strip_suffix(".0").unwrap_or(&text);
            return format!("{text}{suffix}");
        }
    }
    number(x, None)
}

/// Format a date with a `strftime` pattern.
#[must_use]
pub fn date(d: NaiveDate, pattern: &str) -> String {
    d.format(pattern).to_string()
}

/// Roughly `n` round break values covering `[min, max]`.
///
/// Steps are 1, 2 or 5 times a power of ten; the first break is at or below
/// `min` and the last at or above `max`.
#[must_use]
pub fn pretty_breaks(min: f64, max: f64, n: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || n == 0 {
        return Vec::new();
    }
    if (max - min).abs() < f64::EPSILON {
        return vec![min];
    }
    let (lo, hi) = if min < max { (min, max) } else { (max, min) };

    let raw_step = (hi - lo) / n as f64;
    let power = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * power)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * power);

    let start = (lo / step).floor() * step;
    let mut breaks = Vec::new();
    let mut k = 0.0;
    loop {
        let value = start + k * step;
        // Snap float noise so 0.30000000000000004 prints as 0.3.
        let value = (value / step).round() * step;
        breaks.push(value);
        if value >= hi - step * 1e-9 {
            break;
        }
        k += 1.0;
    }
    breaks
}

fn default_accuracy(x: f64) -> f64 {
    let magnitude = x.abs();
    if magnitude >= 100.0 || magnitude == 0.0 || x.fract() == 0.0 {
        1.0
    } else if magnitude >= 1.0 {
        0.1
    } else {
        0.01
    }
}

fn decimals_for(accuracy: f64) -> usize {
    if accuracy >= 1.0 {
        0
    } else {
        (-accuracy.log10() - 1e-9).ceil().max(0.0) as usize
    }
}

fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" after rounding reads as plain zero.
    let sign = if grouped.chars().all(|c| c == '0' || c == ',')
        && frac_part.map_or(true, |f| f.chars().all(|c| c == '0'))
    {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_grouping() {
        assert_eq!(number(1_234_567.0, Some(1.0)), "1,234,567");
        assert_eq!(number(1234.567, Some(0.01)), "1,234.57");
        assert_eq!(number(-9876.0, None), "-9,876");
        assert_eq!(number(12.0, None), "12");
        assert_eq!(number(0.5, None), "0.50");
    }

    #[test]
    fn test_number_negative_zero() {
        assert_eq!(number(-0.001, Some(1.0)), "0");
    }

    #[test]
    fn test_comma() {
        assert_eq!(comma(999.4), "999");
        assert_eq!(comma(1000.0), "1,000");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.253, None), "25%");
        assert_eq!(percent(0.2534, Some(0.1)), "25.3%");
        assert_eq!(percent(12.5, None), "1,250%");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(1234.5, "$"), "$1,234.50");
        assert_eq!(currency(-3.0, "€"), "-€3.00");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact(1200.0), "1.2K");
        assert_eq!(compact(3_400_000.0), "3.4M");
        assert_eq!(compact(2e9), "2B");
        assert_eq!(compact(-5_500.0), "-5.5K");
        assert_eq!(compact(950.0), "950");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(number(f64::NAN, None), "NA");
        assert_eq!(compact(f64::INFINITY), "NA");
    }

    #[test]
    fn test_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date(d, "%b %Y"), "Mar 2024");
    }

    #[test]
    fn test_pretty_breaks() {
        assert_eq!(pretty_breaks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(pretty_breaks(3.0, 97.0, 4), vec![0.0, 50.0, 100.0]);
        let b = pretty_breaks(0.12, 0.38, 3);
        assert!((b[0] - 0.1).abs() < 1e-12);
        assert!(*b.last().unwrap() >= 0.38);
    }

    #[test]
    fn test_pretty_breaks_degenerate() {
        assert_eq!(pretty_breaks(4.0, 4.0, 5), vec![4.0]);
        assert!(pretty_breaks(f64::NAN, 1.0, 5).is_empty());
    }
}
