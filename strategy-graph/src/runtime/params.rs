//! Parameter values exchanged through a generated strategy's getter/setter

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    Unknown(String),
    #[error("parameter '{key}' expects a {expected} value")]
    WrongType { key: String, expected: &'static str },
}

impl ParamValue {
    pub fn as_number(&self, key: &str) -> Result<f64, ParamError> {
        match self {
            ParamValue::Number(n) => Ok(*n),
            _ => Err(ParamError::WrongType {
                key: key.to_string(),
                expected: "number",
            }),
        }
    }

    pub fn as_bool(&self, key: &str) -> Result<bool, ParamError> {
        match self {
            ParamValue::Boolean(b) => Ok(*b),
            _ => Err(ParamError::WrongType {
                key: key.to_string(),
                expected: "boolean",
            }),
        }
    }

    pub fn as_text(&self, key: &str) -> Result<String, ParamError> {
        match self {
            ParamValue::Text(s) => Ok(s.clone()),
            _ => Err(ParamError::WrongType {
                key: key.to_string(),
                expected: "text",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        assert_eq!(ParamValue::Number(3.0).as_number("k"), Ok(3.0));
        assert_eq!(
            ParamValue::Text("x".into()).as_number("RSI_period"),
            Err(ParamError::WrongType {
                key: "RSI_period".to_string(),
                expected: "number"
            })
        );
        assert_eq!(ParamValue::Boolean(true).as_bool("k"), Ok(true));
        assert_eq!(ParamValue::Text("5m".into()).as_text("k"), Ok("5m".to_string()));
    }
}
