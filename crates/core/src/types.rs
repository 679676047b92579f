use crate::error::ConversionError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion target of a scalar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl ValueType {
    pub const ALL: [ValueType; 4] = [
        ValueType::Text,
        ValueType::Integer,
        ValueType::Float,
        ValueType::Boolean,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.tag() == tag)
    }

    /// Converts raw matched text. Numbers and booleans ignore surrounding
    /// whitespace; text is kept as is.
    pub fn convert(self, raw: &str) -> Result<Value, ConversionError> {
        let fail = || ConversionError {
            value: raw.to_string(),
            target: self.tag(),
        };
        let trimmed = raw.trim();
        match self {
            ValueType::Text => Ok(Value::Text(raw.to_string())),
            ValueType::Integer => trimmed.parse().map(Value::Integer).map_err(|_| fail()),
            ValueType::Float => trimmed.parse().map(Value::Float).map_err(|_| fail()),
            ValueType::Boolean => match trimmed {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(fail()),
            },
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown value type '{}'", s))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
