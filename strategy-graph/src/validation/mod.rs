//! Strategy validation
//!
//! Validators never fail: they return every finding so the editor can show all
//! problems at once. Only `Severity::Error` findings block compilation.

pub mod connection;
pub mod strategy;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use connection::{ConnectionIndex, ConnectionValidator};
pub use strategy::StrategyValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingName,
    EmptyStrategy,
    DuplicateId,
    MissingProperty,
    InvalidPropertyType,
    PropertyOutOfRange,
    InvalidOption,
    InvalidConnection,
    DuplicateConnection,
    TypeMismatch,
    MultipleInputs,
    NoInputBlocks,
    NoOutputBlocks,
    MissingConnection,
    OrphanedBlock,
    CircularDependency,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingName => "MISSING_NAME",
            ErrorCode::EmptyStrategy => "EMPTY_STRATEGY",
            ErrorCode::DuplicateId => "DUPLICATE_ID",
            ErrorCode::MissingProperty => "MISSING_PROPERTY",
            ErrorCode::InvalidPropertyType => "INVALID_PROPERTY_TYPE",
            ErrorCode::PropertyOutOfRange => "PROPERTY_OUT_OF_RANGE",
            ErrorCode::InvalidOption => "INVALID_OPTION",
            ErrorCode::InvalidConnection => "INVALID_CONNECTION",
            ErrorCode::DuplicateConnection => "DUPLICATE_CONNECTION",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::MultipleInputs => "MULTIPLE_INPUTS",
            ErrorCode::NoInputBlocks => "NO_INPUT_BLOCKS",
            ErrorCode::NoOutputBlocks => "NO_OUTPUT_BLOCKS",
            ErrorCode::MissingConnection => "MISSING_CONNECTION",
            ErrorCode::OrphanedBlock => "ORPHANED_BLOCK",
            ErrorCode::CircularDependency => "CIRCULAR_DEPENDENCY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message.into())
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message.into())
    }

    fn new(severity: Severity, code: ErrorCode, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            block_id: None,
            connection_id: None,
            suggestion: None,
        }
    }

    pub fn with_block(mut self, block_id: &str) -> Self {
        self.block_id = Some(block_id.to_string());
        self
    }

    pub fn with_connection(mut self, connection_id: &str) -> Self {
        self.connection_id = Some(connection_id.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]: {}", level, self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Findings of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationError>) -> Self {
        Self { issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.is_error())
    }

    /// No errors, so the strategy may be compiled and deployed
    pub fn is_deployable(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_cycle(&self) -> bool {
        self.has_code(ErrorCode::CircularDependency)
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.issues.into_iter().filter(|i| i.is_error()).collect()
    }
}
