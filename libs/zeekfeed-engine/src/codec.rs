//! Field codec: raw text → typed value, per declared kind.
//!
//! Pure and stateless — safe to call from any number of decode workers.

use std::net::IpAddr;

use zeekfeed_api::error::DecodeError;
use zeekfeed_api::field::{FieldKind, SourceFormat};
use zeekfeed_api::value::FieldValue;

/// Decode one raw field according to its declared kind.
///
/// The unset sentinel (and empty input) decodes to the kind's unset value
/// for every kind, never an error. All failures are value results carrying
/// the offending text.
pub fn decode_field(
    raw: &str,
    kind: &FieldKind,
    format: &SourceFormat,
) -> Result<FieldValue, DecodeError> {
    if raw.is_empty() || raw == format.unset_field || raw == format.empty_field {
        return Ok(kind.unset_value());
    }

    match kind {
        FieldKind::Str => Ok(FieldValue::Str(raw.to_string())),
        // Open tag set — passed through, never validated against a closed list.
        FieldKind::Enum => Ok(FieldValue::Enum(raw.to_string())),
        FieldKind::Count => raw
            .parse::<u64>()
            .map(FieldValue::Count)
            .map_err(|_| DecodeError::InvalidCount(raw.to_string())),
        FieldKind::Interval => raw
            .parse::<f64>()
            .map(FieldValue::Interval)
            .map_err(|_| DecodeError::InvalidInterval(raw.to_string())),
        FieldKind::Bool => {
            if raw == format.true_token {
                Ok(FieldValue::Bool(true))
            } else if raw == format.false_token {
                Ok(FieldValue::Bool(false))
            } else {
                Err(DecodeError::InvalidBool(raw.to_string()))
            }
        }
        FieldKind::Addr => raw
            .parse::<IpAddr>()
            .map(FieldValue::Addr)
            .map_err(|_| DecodeError::InvalidAddress(raw.to_string())),
        FieldKind::Port => raw
            .parse::<u16>()
            .map(FieldValue::Port)
            .map_err(|_| DecodeError::InvalidPort(raw.to_string())),
        FieldKind::Time => {
            let seconds = raw
                .parse::<f64>()
                .map_err(|_| DecodeError::InvalidTime(raw.to_string()))?;
            if !seconds.is_finite() {
                return Err(DecodeError::InvalidTime(raw.to_string()));
            }
            // Stored as whole seconds; sub-second precision belongs to the
            // source format, not the record.
            Ok(FieldValue::Time(seconds.trunc() as i64))
        }
        FieldKind::Vector(inner) => {
            let mut values = Vec::new();
            for (index, element) in raw.split(format.set_separator.as_str()).enumerate() {
                match decode_field(element, inner, format) {
                    Ok(value) => values.push(value),
                    Err(cause) => {
                        return Err(DecodeError::InvalidVectorElement {
                            index,
                            inner: Box::new(cause),
                        });
                    }
                }
            }
            Ok(FieldValue::Vector(values))
        }
    }
}

/// Re-encode a value in the source dialect. Inverse of `decode_field` up to
/// value equality (`"300.0"` re-encodes as `"300"`, which decodes equal).
pub fn encode_field(value: &FieldValue, format: &SourceFormat) -> String {
    match value {
        FieldValue::Bool(true) => format.true_token.clone(),
        FieldValue::Bool(false) => format.false_token.clone(),
        FieldValue::Null => format.unset_field.clone(),
        FieldValue::Vector(values) if values.is_empty() => format.empty_field.clone(),
        FieldValue::Vector(values) => values
            .iter()
            .map(|v| encode_field(v, format))
            .collect::<Vec<_>>()
            .join(&format.set_separator),
        other => other.to_string(),
    }
}
