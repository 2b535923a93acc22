//! Scalar normalizers for individual raw cells.
//!
//! None of these functions fail. A value that cannot be interpreted becomes
//! `None` (missing), which is kept distinct from zero or `false`.

use bikeshare_trip_models::RawValue;

/// Trims surrounding whitespace from textual cells. Other cells pass through
/// unchanged.
#[must_use]
pub fn normalize_text(value: RawValue) -> RawValue {
    match value {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                RawValue::Text(s)
            } else {
                RawValue::Text(trimmed.to_owned())
            }
        }
        other => other,
    }
}

/// Parses a latitude or longitude cell.
///
/// Text is trimmed and a decimal comma is accepted. Empty cells are missing.
/// Text that does not parse as a finite number is logged and treated as
/// missing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalize_coordinate(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Empty => None,
        RawValue::Int(i) => Some(*i as f64),
        RawValue::Float(x) => x.is_finite().then_some(*x),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.replace(',', ".").parse::<f64>() {
                Ok(x) if x.is_finite() => Some(x),
                _ => {
                    log::warn!("Cannot format coordinate {s:?}, treating as missing");
                    None
                }
            }
        }
    }
}

/// Parses a 0/1 station flag cell.
///
/// Empty cells are missing. Text that is not an integer is logged and
/// treated as the out-of-range value `2`. Anything other than `0` or `1`
/// is missing.
#[must_use]
pub fn normalize_station_flag(value: &RawValue) -> Option<bool> {
    let resolved: i64 = match value {
        RawValue::Empty => return None,
        RawValue::Int(i) => *i,
        RawValue::Float(x) => {
            if x.abs() < f64::EPSILON {
                0
            } else if (x - 1.0).abs() < f64::EPSILON {
                1
            } else {
                2
            }
        }
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<i64>().unwrap_or_else(|_| {
                log::warn!("Cannot format station flag {s:?}, treating as missing");
                2
            })
        }
    };

    match resolved {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}
