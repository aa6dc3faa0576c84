//! Value conversions between port kinds
//!
//! One function per widening/narrowing pair the compatibility table admits
//! that is not a plain copy.

use std::fmt::Debug;

use crate::runtime::tick::Candle;

pub fn candle_to_number(candle: &Candle) -> f64 {
    candle.close
}

/// Latest element, or NaN for an empty series
pub fn array_to_number(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NAN)
}

/// True when the latest element is a non-zero number
pub fn array_to_bool(values: &[f64]) -> bool {
    values.last().map(|v| v.is_finite() && *v != 0.0).unwrap_or(false)
}

pub fn array_to_text(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn number_to_array(value: f64) -> Vec<f64> {
    vec![value]
}

pub fn bool_to_array(value: bool) -> Vec<f64> {
    vec![if value { 1.0 } else { 0.0 }]
}

/// Comma separated numbers; unparsable entries are skipped
pub fn text_to_array(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(|part| part.trim().parse::<f64>().ok())
        .collect()
}

pub fn number_to_text(value: f64) -> String {
    value.to_string()
}

pub fn bool_to_text(value: bool) -> String {
    value.to_string()
}

/// Rendering used by blocks accepting any kind
pub fn debug_text<T: Debug>(value: &T) -> String {
    format!("{:?}", value)
}
