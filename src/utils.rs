//! Number, time and hex helpers shared by the presentation models.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use rust_decimal::prelude::*;

use crate::error::{AppError, AppResult};

/// Parses an ICON hex quantity (`0x1a`, `-0x1a`). Returns `None` for anything
/// that is not hex-prefixed.
pub fn to_int(value: &str) -> Option<i128> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let digits = digits.strip_prefix("0x")?;
    let parsed = i128::from_str_radix(digits, 16).ok()?;
    Some(if negative { -parsed } else { parsed })
}

/// Hex or plain decimal integer.
pub fn parse_number(value: &str) -> Option<i128> {
    to_int(value).or_else(|| value.trim().parse::<i128>().ok())
}

/// Divides a raw integer by `10^decimals`.
pub fn scale(raw: i128, decimals: u32) -> Decimal {
    if decimals <= 28 {
        if let Ok(d) = Decimal::try_from_i128_with_scale(raw, decimals) {
            return d;
        }
    }

    // Mantissa overflow: split into whole and fractional parts first.
    let divisor = 10i128.checked_pow(decimals).unwrap_or(i128::MAX);
    let whole = Decimal::from_i128(raw / divisor).unwrap_or(if raw < 0 {
        Decimal::MIN
    } else {
        Decimal::MAX
    });
    let mut frac = raw % divisor;
    let mut frac_scale = decimals;
    while frac_scale > 28 {
        frac /= 10;
        frac_scale -= 1;
    }
    let frac = Decimal::try_from_i128_with_scale(frac, frac_scale).unwrap_or(Decimal::ZERO);
    whole.checked_add(frac).unwrap_or(whole)
}

/// Scales a hex quantity; non-hex input scales to zero.
pub fn scale_hex(value: &str, decimals: u32) -> Decimal {
    to_int(value).map(|v| scale(v, decimals)).unwrap_or(Decimal::ZERO)
}

/// Rows to skip before `page` (1-based). Pages past `u64` rows are rejected.
pub fn calculate_skip(page: u64, limit: u64) -> AppResult<u64> {
    page.saturating_sub(1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::Unprocessable(format!("page {} is out of range", page)))
}

/// Mean delta between distinct block timestamps (microseconds), in seconds.
pub fn calculate_average_block_time(block_timestamps: &[i64]) -> Option<f64> {
    let mut timestamps = block_timestamps.to_vec();
    timestamps.sort_unstable();
    timestamps.dedup();
    if timestamps.len() < 2 {
        return None;
    }
    let deltas: i64 = timestamps.windows(2).map(|w| w[1] - w[0]).sum();
    Some(deltas as f64 / (timestamps.len() - 1) as f64 / 1_000_000.0)
}

pub fn micros_to_datetime(timestamp_us: i64) -> NaiveDateTime {
    DateTime::from_timestamp(timestamp_us / 1_000_000, 0)
        .unwrap_or_default()
        .naive_utc()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    Minute,
    Second,
}

/// UTC datetime for `timestamp` (seconds), or now, truncated to `precision`.
pub fn get_datetime_in_utc(timestamp: Option<i64>, precision: TimePrecision) -> NaiveDateTime {
    let dt = match timestamp {
        Some(ts) => DateTime::from_timestamp(ts, 0).unwrap_or_default().naive_utc(),
        None => Utc::now().naive_utc(),
    };
    let dt = dt.with_nanosecond(0).unwrap_or(dt);
    match precision {
        TimePrecision::Second => dt,
        TimePrecision::Minute => dt.with_second(0).unwrap_or(dt),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Absolute value rounded half-to-even with exactly `dp` decimals and grouped
/// thousands.
fn format_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    let text = rounded.to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut frac = frac.to_string();
    while frac.len() < dp as usize {
        frac.push('0');
    }
    frac.truncate(dp as usize);

    let whole = group_thousands(whole);
    if dp == 0 {
        whole
    } else {
        format!("{}.{}", whole, frac)
    }
}

fn sign_prefix(value: Decimal, display_sign: bool) -> &'static str {
    if value.is_sign_negative() {
        "-"
    } else if display_sign {
        "+"
    } else {
        ""
    }
}

/// Renders a number with thousands separators and `precision` significant
/// decimals after any leading fractional zeros.
pub fn format_number(value: Decimal, precision: u32, display_sign: bool) -> String {
    let value = if precision == 0 { value.trunc() } else { value };
    if value.is_zero() {
        return "0".to_string();
    }

    let sign = sign_prefix(value, display_sign);

    if value.fract().is_zero() {
        return format!("{}{}", sign, format_fixed(value, 0));
    }

    let positional = value.abs().normalize().to_string();
    let leading_zeros = positional
        .split_once('.')
        .map(|(_, frac)| frac.chars().take_while(|c| *c == '0').count())
        .unwrap_or(0) as u32;

    let fixed = format_fixed(value, leading_zeros + precision);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", sign, trimmed)
}

pub fn format_number_f64(value: f64, precision: u32, display_sign: bool) -> String {
    format_number(
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO),
        precision,
        display_sign,
    )
}

/// Renders a ratio as a percentage (`0.1234` → `12.34%`).
pub fn format_percentage(value: Decimal, precision: u32, display_sign: bool) -> String {
    if value.is_zero() {
        return if display_sign { "±0%" } else { "0%" }.to_string();
    }
    let percent = value * Decimal::ONE_HUNDRED;
    format!(
        "{}{}%",
        sign_prefix(percent, display_sign),
        format_fixed(percent, precision)
    )
}

/// timeago-style relative time between `date` and `now`.
pub fn to_relative_time(date: NaiveDateTime, now: NaiveDateTime, abbreviate: bool) -> String {
    let diff = (now - date).num_seconds();
    let future = diff < 0;
    let mut amount = diff.abs() as f64;

    const STEPS: [f64; 6] = [60.0, 60.0, 24.0, 7.0, 365.0 / 7.0 / 12.0, 12.0];
    const UNITS: [&str; 7] = ["second", "minute", "hour", "day", "week", "month", "year"];

    let mut unit = 0;
    while unit < STEPS.len() && amount >= STEPS[unit] {
        amount /= STEPS[unit];
        unit += 1;
    }
    let amount = amount as i64;

    if unit == 0 && amount < 10 {
        return if future { "right now" } else { "just now" }.to_string();
    }

    let text = match (amount, future) {
        (1, false) if unit > 0 => format!("1 {} ago", UNITS[unit]),
        (1, true) if unit > 0 => format!("in 1 {}", UNITS[unit]),
        (n, false) => format!("{} {}s ago", n, UNITS[unit]),
        (n, true) => format!("in {} {}s", n, UNITS[unit]),
    };

    if !abbreviate {
        return text;
    }
    text.replace("seconds", "sec")
        .replace("minutes", "min")
        .replace("hours", "hr")
}

const COUNTRY_ALPHA3_TO_ALPHA2: [(&str, &str); 36] = [
    ("ARE", "AE"),
    ("AUS", "AU"),
    ("AUT", "AT"),
    ("BEL", "BE"),
    ("BGR", "BG"),
    ("CAN", "CA"),
    ("CHE", "CH"),
    ("CHN", "CN"),
    ("CYM", "KY"),
    ("CZE", "CZ"),
    ("DEU", "DE"),
    ("EST", "EE"),
    ("FRA", "FR"),
    ("GBR", "GB"),
    ("GRC", "GR"),
    ("GRD", "GD"),
    ("HRV", "HR"),
    ("IND", "IN"),
    ("ITA", "IT"),
    ("JPN", "JP"),
    ("KEN", "KE"),
    ("KOR", "KR"),
    ("MLT", "MT"),
    ("NLD", "NL"),
    ("NZL", "NZ"),
    ("PHL", "PH"),
    ("PRI", "PR"),
    ("RUS", "RU"),
    ("SGP", "SG"),
    ("SVN", "SI"),
    ("SWE", "SE"),
    ("THA", "TH"),
    ("UKR", "UA"),
    ("USA", "US"),
    ("VEN", "VE"),
    ("ZAF", "ZA"),
];

/// Flag emoji as HTML entities for an ISO 3166 alpha-3 code; empty when unknown.
pub fn convert_country_code_to_hex(country_code: &str) -> String {
    let Some((_, alpha2)) = COUNTRY_ALPHA3_TO_ALPHA2
        .iter()
        .find(|(alpha3, _)| *alpha3 == country_code)
    else {
        tracing::debug!("Unknown country code {}", country_code);
        return String::new();
    };
    alpha2
        .bytes()
        .map(|b| format!("&#{};", 127462 + (b - b'A') as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_int() {
        assert_eq!(to_int("0x1a"), Some(26));
        assert_eq!(to_int("-0x1a"), Some(-26));
        assert_eq!(to_int("0x0"), Some(0));
        assert_eq!(to_int("26"), None);
        assert_eq!(to_int("0xzz"), None);
        assert_eq!(parse_number("26"), Some(26));
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(1_500_000_000_000_000_000, 18), dec!(1.5));
        assert_eq!(scale_hex("0xde0b6b3a7640000", 18), dec!(1));
        assert_eq!(scale_hex("not hex", 18), Decimal::ZERO);
        // 2^100 loop does not fit a 96-bit mantissa at scale 18.
        let big = 1i128 << 100;
        let scaled = scale(big, 18);
        assert_eq!(scaled.trunc(), dec!(1267650600228));
    }

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(Decimal::ZERO, 4, false), "0");
        assert_eq!(format_number(dec!(0.4), 0, false), "0");
    }

    #[test]
    fn test_format_number_integers() {
        assert_eq!(format_number(dec!(1234567), 4, false), "1,234,567");
        assert_eq!(format_number(dec!(1234567), 4, true), "+1,234,567");
        assert_eq!(format_number(dec!(-1234), 4, false), "-1,234");
        assert_eq!(format_number(dec!(1234.99), 0, false), "1,234");
    }

    #[test]
    fn test_format_number_fractions() {
        assert_eq!(format_number(dec!(1234.5), 4, false), "1,234.5");
        assert_eq!(format_number(dec!(0.000123456), 4, false), "0.0001235");
        assert_eq!(format_number(dec!(12.00345678), 4, false), "12.003457");
        assert_eq!(format_number(dec!(-0.5), 4, true), "-0.5");
        assert_eq!(format_number(dec!(0.25), 4, true), "+0.25");
        assert_eq!(format_number(dec!(0.99999), 4, false), "1");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Decimal::ZERO, 2, false), "0%");
        assert_eq!(format_percentage(Decimal::ZERO, 2, true), "±0%");
        assert_eq!(format_percentage(dec!(0.1234), 2, false), "12.34%");
        assert_eq!(format_percentage(dec!(0.05), 2, true), "+5.00%");
        assert_eq!(format_percentage(dec!(-0.05), 2, true), "-5.00%");
        assert_eq!(format_percentage(dec!(35), 2, false), "3,500.00%");
    }

    #[test]
    fn test_average_block_time() {
        let timestamps = [6_000_000, 2_000_000, 4_000_000, 4_000_000];
        assert_eq!(calculate_average_block_time(&timestamps), Some(2.0));
        assert_eq!(calculate_average_block_time(&[1_000_000]), None);
    }

    #[test]
    fn test_calculate_skip() {
        assert_eq!(calculate_skip(1, 50).unwrap(), 0);
        assert_eq!(calculate_skip(3, 25).unwrap(), 50);
        assert_eq!(calculate_skip(0, 25).unwrap(), 0);
        assert!(matches!(
            calculate_skip(u64::MAX, 100),
            Err(AppError::Unprocessable(_))
        ));
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now().naive_utc();
        assert_eq!(to_relative_time(now, now, true), "just now");
        assert_eq!(
            to_relative_time(now - Duration::seconds(30), now, true),
            "30 sec ago"
        );
        assert_eq!(
            to_relative_time(now - Duration::seconds(30), now, false),
            "30 seconds ago"
        );
        assert_eq!(
            to_relative_time(now - Duration::seconds(90), now, true),
            "1 minute ago"
        );
        assert_eq!(
            to_relative_time(now - Duration::minutes(5), now, true),
            "5 min ago"
        );
        assert_eq!(
            to_relative_time(now - Duration::hours(3), now, true),
            "3 hr ago"
        );
        assert_eq!(
            to_relative_time(now - Duration::days(2), now, true),
            "2 days ago"
        );
    }

    #[test]
    fn test_datetime_precision() {
        let dt = get_datetime_in_utc(Some(1_650_000_045), TimePrecision::Minute);
        assert_eq!(dt.format("%Y-%m-%dT%H:%M:%S").to_string(), "2022-04-15T05:20:00");
        let dt = get_datetime_in_utc(Some(1_650_000_045), TimePrecision::Second);
        assert_eq!(dt.second(), 45);
    }

    #[test]
    fn test_country_flags() {
        assert_eq!(convert_country_code_to_hex("USA"), "&#127482;&#127480;");
        assert_eq!(convert_country_code_to_hex("KOR"), "&#127472;&#127479;");
        assert_eq!(convert_country_code_to_hex("XXX"), "");
    }
}
