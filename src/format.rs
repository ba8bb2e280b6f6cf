use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// US-style phone rendering; anything that is not 10 digits passes through.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.len() {
        11 if digits.starts_with('1') => &digits[1..],
        _ => digits.as_str(),
    };
    if digits.len() != 10 {
        return raw.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Renders RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and plain dates as
/// `Jan 5, 2026`. Unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_date_time(raw: &str) -> String {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return stamp.format("%b %-d, %Y %H:%M").to_string();
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return stamp.format("%b %-d, %Y %H:%M").to_string();
    }
    format_date(raw)
}

/// Random v4 id for DOM elements, rendered as `{prefix}-{32 hex digits}`.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_with_ten_digits_are_grouped() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_phone("+1 555 123 4567"), "(555) 123-4567");
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn currency_has_cents_and_separators() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.1), "-$42.10");
    }

    #[test]
    fn dates_render_short_month() {
        assert_eq!(format_date("2026-01-05"), "Jan 5, 2026");
        assert_eq!(format_date("2026-01-05T23:10:00Z"), "Jan 5, 2026");
        assert_eq!(format_date("2026-03-14 08:00:00"), "Mar 14, 2026");
        assert_eq!(format_date("soon"), "soon");
        assert_eq!(format_date_time("2026-01-05T09:30:00Z"), "Jan 5, 2026 09:30");
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let first = generate_id("modal");
        let second = generate_id("modal");
        assert!(first.starts_with("modal-"));
        assert_eq!(first.len(), "modal-".len() + 32);
        assert!(first["modal-".len()..].chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
