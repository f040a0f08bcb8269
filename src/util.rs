// Parsing helpers, week numbering and small statistics.
//
// All the forgiving cell-level parsing lives here so the stages can work
// with typed values and plain `Option`s for missing cells.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

/// Canonical cleaned date format.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Canonical cleaned time format.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Format of persisted order timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// The canonical format comes first so already-cleaned dates parse back to
// themselves.
const DATE_FORMATS: &[&str] = &[
    DATE_FORMAT,
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%A %d-%b-%Y",
    "%d-%b-%Y",
    "%B %d %Y",
    "%b %d %Y",
    // two-digit years, month first like the four-digit slash layout
    "%m/%d/%y",
    "%m-%d-%y",
    "%d/%m/%y",
    "%d-%m-%y",
];

const TIME_FORMATS: &[&str] = &[
    TIME_FORMAT,
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%HH %MM %SS",
];

/// Parsed dates outside these years are treated as misreads.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Epoch seconds need at least this many integer digits (1973 onwards).
const MIN_EPOCH_DIGITS: usize = 9;

/// Larger quantities are read as data-entry errors.
pub const MAX_QUANTITY: u32 = 100;

const DATETIME_FORMATS: &[&str] = &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// A quantity is valid only when its raw text is made of decimal digits.
///
/// Signs, decimal points, letters, whitespace and blanks all yield `None`,
/// as do values above [`MAX_QUANTITY`].
pub fn parse_quantity(s: Option<&str>) -> Option<u32> {
    let s = s?;
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|q| *q <= MAX_QUANTITY)
}

/// Row identifiers: integer text, or float text with no fractional part
/// (`"12.0"`, as spreadsheet exports tend to write them).
pub fn parse_id(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

fn plausible(dt: &NaiveDateTime) -> bool {
    PLAUSIBLE_YEARS.contains(&dt.year())
}

fn parse_epoch(s: &str) -> Option<NaiveDateTime> {
    let int_part = s.split('.').next().unwrap_or_default();
    if int_part.len() < MIN_EPOCH_DIGITS || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let secs = s.parse::<f64>().ok()?;
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
        .map(|dt| dt.naive_utc())
        .filter(plausible)
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().filter(plausible))
}

/// Error-tolerant date parsing. Anything unrecognised is `None`.
pub fn parse_date_lenient(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .filter(|d| PLAUSIBLE_YEARS.contains(&d.year()))
        })
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
        .or_else(|| parse_epoch(s).map(|dt| dt.date()))
}

/// Error-tolerant time-of-day parsing. Anything unrecognised is `None`.
pub fn parse_time_lenient(s: Option<&str>) -> Option<NaiveTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_datetime(s).map(|dt| dt.time()))
        .or_else(|| parse_epoch(s).map(|dt| dt.time()))
}

/// Week of the year with Monday as the first day of the week.
///
/// Days before the first Monday of the year fall in week 0, so the result is
/// in `0..=53`. This is the `%W` convention, not ISO 8601.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let yday = date.ordinal0();
    let wday = date.weekday().num_days_from_monday();
    (yday + 7 - wday) / 7
}

/// Item identifier with its trailing `_size` suffix removed.
pub fn base_item_type(item: &str) -> &str {
    item.rsplit_once('_').map(|(base, _)| base).unwrap_or(item)
}

/// Trailing `_size` suffix of an item identifier, if any.
pub fn item_size(item: &str) -> Option<&str> {
    item.rsplit_once('_').map(|(_, size)| size)
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // Takes the vector by value so it can be sorted in place.
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
