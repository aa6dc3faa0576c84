//! Port type compatibility
//!
//! The one compatibility table of the engine. Connection creation, whole-graph
//! validation and code generation all ask `is_compatible`.

use shared::DataKind;

/// Whether a `source` output may feed a `target` input
pub fn is_compatible(source: DataKind, target: DataKind) -> bool {
    if source == DataKind::Any || target == DataKind::Any {
        return true;
    }
    if source == target {
        return true;
    }
    match (source, target) {
        (DataKind::Candle, DataKind::Number) | (DataKind::Indicator, DataKind::Number) => true,
        (DataKind::Signal, DataKind::Boolean) => true,
        (DataKind::Number, DataKind::String) | (DataKind::Boolean, DataKind::String) => true,
        (DataKind::Array, other) | (other, DataKind::Array) => other.is_scalar(),
        _ => false,
    }
}

/// Catalog block that can sit between two incompatible kinds, if any
///
/// The named block takes `source` on one of its inputs and produces an output
/// `target` accepts.
pub fn conversion_hint(source: DataKind, target: DataKind) -> Option<&'static str> {
    match (source, target) {
        (DataKind::Number, DataKind::Boolean)
        | (DataKind::Indicator, DataKind::Boolean)
        | (DataKind::Candle, DataKind::Boolean) => Some("Compare"),
        (DataKind::Number, DataKind::Signal) | (DataKind::Indicator, DataKind::Signal) => {
            Some("Crossover")
        }
        _ => None,
    }
}
