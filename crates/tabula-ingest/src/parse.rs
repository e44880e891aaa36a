//! Typed parsing of single cell texts.
//!
//! Every parser returns the message to report on failure; the pipeline
//! decides what to substitute.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tabula_core::schema::{ColumnMetadata, GenericType};
use tabula_core::{Decimal, SqlValue};

/// Earliest storable date, the floor of the common backend `DATETIME`.
pub const MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1753, 1, 1) {
    Some(d) => d,
    None => panic!("invalid minimum date"),
};

/// Latest storable date.
pub const MAX_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(d) => d,
    None => panic!("invalid maximum date"),
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Serial values accepted by spreadsheet applications: 0100-01-01 up to the
/// end of 9999-12-31.
const SERIAL_MIN: f64 = -657_435.0;
const SERIAL_MAX: f64 = 2_958_466.0;

/// Text date formats, tried in order. `%m`/`%d` accept one or two digits.
const DATE_FORMATS: [&str; 3] = ["%Y/%m/%d", "%Y-%m-%d", "%m/%d/%Y"];

/// Parses `text` as a value of `ty`.
///
/// `column` and `row` only feed the failure message.
///
/// # Errors
///
/// The message describing why `text` is not a valid `ty` for `meta`.
pub fn parse_cell(
    text: &str,
    ty: GenericType,
    meta: &ColumnMetadata,
    column: &str,
    row: u32,
) -> Result<SqlValue, String> {
    match ty {
        GenericType::Integer => text
            .trim()
            .parse::<i32>()
            .map(|v| SqlValue::Int(i64::from(v)))
            .map_err(|_| {
                format!("Expected integer for column '{column}' at row {row}, got '{text}'.")
            }),
        GenericType::Decimal => parse_decimal(text, meta.precision, meta.scale)
            .map(SqlValue::Decimal)
            .ok_or_else(|| {
                format!(
                    "Expected decimal with precision {} and scale {} for column '{column}' at row {row}, got '{text}'.",
                    display_opt(meta.precision),
                    display_opt(meta.scale),
                )
            }),
        GenericType::DateTime => parse_datetime(text, column, row).map(SqlValue::DateTime),
        GenericType::Boolean => parse_bool(text)
            .map(SqlValue::Bool)
            .ok_or_else(|| {
                format!("Expected boolean for column '{column}' at row {row}, got '{text}'.")
            }),
        GenericType::String => match meta.length {
            Some(max) if text.chars().count() > max as usize => Err(format!(
                "String length exceeds {max} for column '{column}' at row {row}, got '{text}'."
            )),
            _ => Ok(SqlValue::Text(text.to_string())),
        },
    }
}

/// Value substituted for a missing or invalid cell in a non-nullable column.
#[must_use]
pub fn default_value(ty: GenericType) -> SqlValue {
    match ty {
        GenericType::Integer => SqlValue::Int(0),
        GenericType::Decimal => SqlValue::Decimal(Decimal::ZERO),
        GenericType::DateTime => SqlValue::DateTime(MIN_DATE.and_time(chrono::NaiveTime::MIN)),
        GenericType::Boolean => SqlValue::Bool(false),
        GenericType::String => SqlValue::Text(String::new()),
    }
}

fn display_opt(value: Option<u8>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parses an invariant-culture decimal exactly and checks it against
/// `precision`/`scale` when both are known.
fn parse_decimal(text: &str, precision: Option<u8>, scale: Option<u8>) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let value = if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned).ok()?
    } else {
        Decimal::from_str_exact(&cleaned).ok()?
    };

    let (Some(precision), Some(scale)) = (precision, scale) else {
        return Some(value);
    };

    let fraction_digits = value.scale() as usize;
    let digits = value.mantissa().unsigned_abs().to_string().len();
    let integer_digits = digits.saturating_sub(fraction_digits).max(1);

    let total = integer_digits + fraction_digits;
    (total <= usize::from(precision) && fraction_digits <= usize::from(scale)).then_some(value)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" => Some(true),
        "0" => Some(false),
        t if t.eq_ignore_ascii_case("true") => Some(true),
        t if t.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_datetime(text: &str, column: &str, row: u32) -> Result<NaiveDateTime, String> {
    let trimmed = text.trim();
    let parsed = if let Ok(serial) = trimmed.parse::<f64>() {
        from_serial(serial).ok_or_else(|| {
            format!("Invalid spreadsheet serial date '{text}' for column '{column}' at row {row}.")
        })?
    } else {
        parse_text_date(trimmed).ok_or_else(|| {
            format!("Expected datetime for column '{column}' at row {row}, got '{text}'.")
        })?
    };

    if in_supported_range(parsed) {
        Ok(parsed)
    } else {
        Err(format!(
            "Date '{text}' for column '{column}' at row {row} is outside the supported range (1753-01-01 to 9999-12-31)."
        ))
    }
}

fn parse_text_date(text: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS.iter().find_map(|format| {
        // The dashed form only accepts two-digit month and day
        if format.contains('-') && text.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(text, format)
            .ok()
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
    })
}

fn in_supported_range(value: NaiveDateTime) -> bool {
    let date = value.date();
    (MIN_DATE..=MAX_DATE).contains(&date)
}

/// Converts a spreadsheet serial date (days since 1899-12-30, fraction =
/// time of day) to a timestamp, rounded to the millisecond.
///
/// For negative serials the fraction still moves forward from midnight.
#[must_use]
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= SERIAL_MIN || serial >= SERIAL_MAX {
        return None;
    }
    let offset = if serial >= 0.0 { 0.5 } else { -0.5 };
    #[allow(clippy::cast_possible_truncation)]
    let mut millis = serial.mul_add(MILLIS_PER_DAY, offset) as i64;
    if millis < 0 {
        millis -= (millis % 86_400_000) * 2;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(chrono::NaiveTime::MIN);
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}
