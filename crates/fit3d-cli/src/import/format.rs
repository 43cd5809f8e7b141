//! Display formatting for status lines
//!
//! Pure functions taking explicit configuration (time zone, precision)
//! in place of shared formatter state.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::store::Unit;

/// Scan dates are reported in Eastern time.
pub const REPORT_TIME_ZONE: Tz = chrono_tz::America::New_York;

/// Format a scan date as `M/d/yy h:mm a` in the given time zone,
/// e.g. `6/2/18 2:30 PM`.
pub fn scan_date(date: DateTime<Utc>, tz: Tz) -> String {
    date.with_timezone(&tz).format("%-m/%-d/%y %-I:%M %p").to_string()
}

/// Format a value with at most `max_digits` fraction digits, dropping
/// trailing zeros, e.g. `72.456` -> `72.46`, `150.0` -> `150`.
pub fn decimal(value: f64, max_digits: usize) -> String {
    let fixed = format!("{:.*}", max_digits, value);
    if !fixed.contains('.') {
        return fixed;
    }
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Unit suffix appended directly after a formatted value. Dimensionless
/// counts get none; mass and length get their unit string; percent gets a
/// literal `%`.
pub fn unit_suffix(unit: Unit) -> &'static str {
    match unit {
        Unit::Count => "",
        Unit::Pound => "lb",
        Unit::Kilogram => "kg",
        Unit::Inch => "in",
        Unit::Centimeter => "cm",
        Unit::Percent => "%",
    }
}
