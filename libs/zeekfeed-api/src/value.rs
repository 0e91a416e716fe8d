use std::fmt;
use std::net::IpAddr;

/// Typed value of a single decoded field.
///
/// Mirrors `FieldKind` variant for variant. `Null` is the unset marker for
/// kinds without a natural zero (addresses); every other kind unsets to its
/// zero value instead.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Count(u64),
    Interval(f64),
    Bool(bool),
    Addr(IpAddr),
    Port(u16),
    Enum(String),
    /// Whole seconds since the epoch.
    Time(i64),
    Vector(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text content, for `Str` and `Enum` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            FieldValue::Count(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<f64> {
        match self {
            FieldValue::Interval(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_addr(&self) -> Option<IpAddr> {
        match self {
            FieldValue::Addr(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<u16> {
        match self {
            FieldValue::Port(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<i64> {
        match self {
            FieldValue::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// JSON form for stores that persist records as documents.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Str(s) | FieldValue::Enum(s) => serde_json::Value::String(s.clone()),
            FieldValue::Count(v) => serde_json::Value::Number((*v).into()),
            FieldValue::Interval(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(v) => serde_json::Value::Bool(*v),
            FieldValue::Addr(addr) => serde_json::Value::String(addr.to_string()),
            FieldValue::Port(v) => serde_json::Value::Number((*v).into()),
            FieldValue::Time(v) => serde_json::Value::Number((*v).into()),
            FieldValue::Vector(values) => {
                serde_json::Value::Array(values.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Enum(s) => write!(f, "{s}"),
            FieldValue::Count(v) => write!(f, "{v}"),
            FieldValue::Interval(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Addr(addr) => write!(f, "{addr}"),
            FieldValue::Port(v) => write!(f, "{v}"),
            FieldValue::Time(v) => write!(f, "{v}"),
            FieldValue::Vector(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            FieldValue::Null => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(FieldValue::Count(7).as_count(), Some(7));
        assert_eq!(FieldValue::Count(7).as_bool(), None);
        assert_eq!(FieldValue::Enum("udp".into()).as_str(), Some("udp"));
        assert!(FieldValue::Null.is_null());
    }

    #[test]
    fn json_form() {
        let value = FieldValue::Vector(vec![
            FieldValue::Interval(300.0),
            FieldValue::Interval(60.5),
        ]);
        assert_eq!(value.to_json(), serde_json::json!([300.0, 60.5]));
        assert_eq!(FieldValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(
            FieldValue::Addr("10.0.0.1".parse().unwrap()).to_json(),
            serde_json::json!("10.0.0.1")
        );
    }
}
