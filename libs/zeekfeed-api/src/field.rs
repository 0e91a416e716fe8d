use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::value::FieldValue;

/// Declared type of a single log field.
///
/// This is the vocabulary the log-acquisition side speaks: each column of a
/// source format is annotated with one of these kinds, and the codec coerces
/// the raw text accordingly. `Vector` elements are always scalar — the source
/// formats have no nested containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form text. Empty input is a valid (unset) value.
    Str,
    /// Non-negative integer counter.
    Count,
    /// Floating-point duration in seconds.
    Interval,
    Bool,
    /// IPv4 or IPv6 literal.
    Addr,
    /// Integer in 0..=65535.
    Port,
    /// Open tag set — passed through as text, never validated against a
    /// closed list.
    Enum,
    /// Absolute instant, stored as whole seconds since the epoch.
    Time,
    Vector(Box<FieldKind>),
}

impl FieldKind {
    pub fn vector(inner: FieldKind) -> Result<Self, SchemaError> {
        if let FieldKind::Vector(_) = inner {
            return Err(SchemaError::NestedVector);
        }
        Ok(FieldKind::Vector(Box::new(inner)))
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldKind::Vector(_))
    }

    /// The value an absent optional field holds. Records always carry every
    /// declared field, so "missing" must be representable per kind.
    pub fn unset_value(&self) -> FieldValue {
        match self {
            FieldKind::Str => FieldValue::Str(String::new()),
            FieldKind::Count => FieldValue::Count(0),
            FieldKind::Interval => FieldValue::Interval(0.0),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Addr => FieldValue::Null,
            FieldKind::Port => FieldValue::Port(0),
            FieldKind::Enum => FieldValue::Enum(String::new()),
            FieldKind::Time => FieldValue::Time(0),
            FieldKind::Vector(_) => FieldValue::Vector(Vec::new()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Str => write!(f, "string"),
            FieldKind::Count => write!(f, "count"),
            FieldKind::Interval => write!(f, "interval"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Addr => write!(f, "addr"),
            FieldKind::Port => write!(f, "port"),
            FieldKind::Enum => write!(f, "enum"),
            FieldKind::Time => write!(f, "time"),
            FieldKind::Vector(inner) => write!(f, "vector[{inner}]"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldKind::Str),
            "count" => Ok(FieldKind::Count),
            "interval" => Ok(FieldKind::Interval),
            "bool" => Ok(FieldKind::Bool),
            "addr" => Ok(FieldKind::Addr),
            "port" => Ok(FieldKind::Port),
            "enum" => Ok(FieldKind::Enum),
            "time" => Ok(FieldKind::Time),
            other => {
                let inner = other
                    .strip_prefix("vector[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| SchemaError::UnknownFieldKind(other.to_string()))?;
                FieldKind::vector(inner.parse()?)
            }
        }
    }
}

fn default_unset_field() -> String {
    "-".to_string()
}

fn default_empty_field() -> String {
    "(empty)".to_string()
}

fn default_set_separator() -> String {
    ",".to_string()
}

fn default_true_token() -> String {
    "T".to_string()
}

fn default_false_token() -> String {
    "F".to_string()
}

/// Textual dialect of a log source: the sentinels and separators the codec
/// needs to interpret raw field text. Defaults match the Zeek TSV format.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SourceFormat {
    #[serde(default = "default_unset_field")]
    pub unset_field: String,
    #[serde(default = "default_empty_field")]
    pub empty_field: String,
    #[serde(default = "default_set_separator")]
    pub set_separator: String,
    #[serde(default = "default_true_token")]
    pub true_token: String,
    #[serde(default = "default_false_token")]
    pub false_token: String,
}

impl Default for SourceFormat {
    fn default() -> Self {
        Self {
            unset_field: default_unset_field(),
            empty_field: default_empty_field(),
            set_separator: default_set_separator(),
            true_token: default_true_token(),
            false_token: default_false_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_annotations_round_trip() {
        for raw in [
            "string",
            "count",
            "interval",
            "bool",
            "addr",
            "port",
            "enum",
            "time",
            "vector[string]",
            "vector[interval]",
        ] {
            let kind: FieldKind = raw.parse().unwrap();
            assert_eq!(kind.to_string(), raw);
        }
    }

    #[test]
    fn nested_vector_rejected() {
        assert!(matches!(
            "vector[vector[string]]".parse::<FieldKind>(),
            Err(SchemaError::NestedVector)
        ));
        assert!(matches!(
            FieldKind::vector(FieldKind::Vector(Box::new(FieldKind::Str))),
            Err(SchemaError::NestedVector)
        ));
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(matches!(
            "duration".parse::<FieldKind>(),
            Err(SchemaError::UnknownFieldKind(_))
        ));
    }

    #[test]
    fn unset_values_match_kinds() {
        assert_eq!(FieldKind::Count.unset_value(), FieldValue::Count(0));
        assert_eq!(FieldKind::Bool.unset_value(), FieldValue::Bool(false));
        assert_eq!(FieldKind::Addr.unset_value(), FieldValue::Null);
        assert_eq!(
            FieldKind::Vector(Box::new(FieldKind::Str)).unset_value(),
            FieldValue::Vector(Vec::new())
        );
    }
}
