//! Record decoder: one header-aligned raw line → one typed record.

use std::collections::HashMap;
use std::sync::Arc;

use zeekfeed_api::field::SourceFormat;
use zeekfeed_api::record::Record;
use zeekfeed_api::schema::RecordSchema;

use crate::codec::decode_field;
use crate::error::EngineError;

/// One log line, already split and aligned to the source header: ordered
/// `(source field name, raw text)` pairs.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub fields: Vec<(String, String)>,
}

impl RawLine {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }
}

/// Decodes raw lines against one kind's schema. Stateless beyond the shared
/// schema — safe to use from concurrent workers.
pub struct RecordDecoder {
    schema: Arc<RecordSchema>,
    format: SourceFormat,
}

impl RecordDecoder {
    pub fn new(schema: Arc<RecordSchema>, format: SourceFormat) -> Self {
        Self { schema, format }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Decode one line into a record.
    ///
    /// Walks the schema's declared field order; the first failing field
    /// aborts the whole record — partial records are never produced. Columns
    /// present in the line but absent from the schema are ignored, which
    /// keeps old schemas working when the log format grows new columns.
    pub fn decode(&self, line: &RawLine) -> Result<Record, EngineError> {
        let by_name: HashMap<&str, &str> = line
            .fields
            .iter()
            .map(|(name, raw)| (name.as_str(), raw.as_str()))
            .collect();

        let mut values = Vec::with_capacity(self.schema.fields.len());
        for descriptor in &self.schema.fields {
            match by_name.get(descriptor.source_name.as_str()) {
                None => {
                    if descriptor.required {
                        return Err(EngineError::MissingRequiredField {
                            kind: self.schema.kind.clone(),
                            field: descriptor.source_name.clone(),
                        });
                    }
                    values.push(descriptor.kind.unset_value());
                }
                Some(raw) => match decode_field(raw, &descriptor.kind, &self.format) {
                    Ok(value) => values.push(value),
                    Err(cause) => {
                        return Err(EngineError::RecordDecode {
                            kind: self.schema.kind.clone(),
                            field: descriptor.source_name.clone(),
                            cause,
                        });
                    }
                },
            }
        }

        Ok(Record::new(self.schema.clone(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeekfeed_api::error::DecodeError;
    use zeekfeed_api::value::FieldValue;

    use crate::kinds;

    fn dns_decoder() -> RecordDecoder {
        RecordDecoder::new(Arc::new(kinds::dns::schema()), SourceFormat::default())
    }

    fn dns_line() -> RawLine {
        RawLine::new(
            [
                ("ts", "1500000000.0"),
                ("uid", "Cxyz1"),
                ("id.orig_h", "10.0.0.1"),
                ("id.orig_p", "53"),
                ("id.resp_h", "8.8.8.8"),
                ("id.resp_p", "53"),
                ("proto", "udp"),
                ("trans_id", "12345"),
                ("rtt", "0.001"),
                ("query", "example.com"),
                ("qclass", "1"),
                ("qclass_name", "C_INTERNET"),
                ("qtype", "1"),
                ("qtype_name", "A"),
                ("rcode", "0"),
                ("rcode_name", "NOERROR"),
                ("AA", "F"),
                ("TC", "F"),
                ("RD", "T"),
                ("RA", "T"),
                ("Z", "0"),
                ("answers", "93.184.216.34"),
                ("TTLs", "300.0"),
                ("rejected", "F"),
            ]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        )
    }

    fn with_field(mut line: RawLine, name: &str, raw: &str) -> RawLine {
        for (n, v) in &mut line.fields {
            if n == name {
                *v = raw.to_string();
            }
        }
        line
    }

    fn without_field(mut line: RawLine, name: &str) -> RawLine {
        line.fields.retain(|(n, _)| n != name);
        line
    }

    #[test]
    fn full_dns_line_decodes() {
        let record = dns_decoder().decode(&dns_line()).unwrap();

        assert_eq!(record.kind(), "dns");
        assert_eq!(record.get("ts"), Some(&FieldValue::Time(1_500_000_000)));
        assert_eq!(record.get("uid"), Some(&FieldValue::Str("Cxyz1".into())));
        assert_eq!(record.get("id_orig_h"), Some(&FieldValue::Addr("10.0.0.1".parse().unwrap())));
        assert_eq!(record.get("id_orig_p"), Some(&FieldValue::Port(53)));
        assert_eq!(record.get("id_resp_h"), Some(&FieldValue::Addr("8.8.8.8".parse().unwrap())));
        assert_eq!(record.get("proto"), Some(&FieldValue::Enum("udp".into())));
        assert_eq!(record.get("trans_id"), Some(&FieldValue::Count(12345)));
        assert_eq!(record.get("RTT"), Some(&FieldValue::Interval(0.001)));
        assert_eq!(record.get("query"), Some(&FieldValue::Str("example.com".into())));
        assert_eq!(record.get("AA"), Some(&FieldValue::Bool(false)));
        assert_eq!(record.get("RD"), Some(&FieldValue::Bool(true)));
        assert_eq!(record.get("RA"), Some(&FieldValue::Bool(true)));
        assert_eq!(record.get("Z"), Some(&FieldValue::Count(0)));
        assert_eq!(
            record.get("answers"),
            Some(&FieldValue::Vector(vec![FieldValue::Str("93.184.216.34".into())]))
        );
        assert_eq!(
            record.get("TTLs"),
            Some(&FieldValue::Vector(vec![FieldValue::Interval(300.0)]))
        );
        assert_eq!(record.get("rejected"), Some(&FieldValue::Bool(false)));

        // Exactly the declared field set, nothing extra.
        assert_eq!(record.values.len(), record.schema.fields.len());
    }

    #[test]
    fn bad_port_aborts_the_record_naming_field_and_cause() {
        let line = with_field(dns_line(), "id.orig_p", "not-a-port");
        match dns_decoder().decode(&line) {
            Err(EngineError::RecordDecode { kind, field, cause }) => {
                assert_eq!(kind, "dns");
                assert_eq!(field, "id.orig_p");
                assert_eq!(cause, DecodeError::InvalidPort("not-a-port".into()));
            }
            other => panic!("expected RecordDecode, got {other:?}"),
        }
    }

    #[test]
    fn each_missing_required_field_is_named() {
        for required in ["ts", "uid", "id.orig_h", "id.orig_p", "id.resp_h", "id.resp_p"] {
            let line = without_field(dns_line(), required);
            match dns_decoder().decode(&line) {
                Err(EngineError::MissingRequiredField { kind, field }) => {
                    assert_eq!(kind, "dns");
                    assert_eq!(field, required);
                }
                other => panic!("expected MissingRequiredField for {required}, got {other:?}"),
            }
        }
    }

    #[test]
    fn absent_optional_fields_hold_unset_values() {
        let line = RawLine::new(
            [
                ("ts", "1500000000.0"),
                ("uid", "Cxyz1"),
                ("id.orig_h", "10.0.0.1"),
                ("id.orig_p", "53"),
                ("id.resp_h", "8.8.8.8"),
                ("id.resp_p", "53"),
            ]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        );
        let record = dns_decoder().decode(&line).unwrap();

        assert_eq!(record.values.len(), record.schema.fields.len());
        assert_eq!(record.get("proto"), Some(&FieldValue::Enum(String::new())));
        assert_eq!(record.get("trans_id"), Some(&FieldValue::Count(0)));
        assert_eq!(record.get("RTT"), Some(&FieldValue::Interval(0.0)));
        assert_eq!(record.get("AA"), Some(&FieldValue::Bool(false)));
        assert_eq!(record.get("answers"), Some(&FieldValue::Vector(Vec::new())));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let mut line = dns_line();
        line.fields.push(("future_column".to_string(), "whatever".to_string()));
        let record = dns_decoder().decode(&line).unwrap();
        assert_eq!(record.values.len(), record.schema.fields.len());
        assert_eq!(record.get("future_column"), None);
    }

    #[test]
    fn decoding_is_idempotent_up_to_id() {
        let decoder = dns_decoder();
        let a = decoder.decode(&dns_line()).unwrap();
        let b = decoder.decode(&dns_line()).unwrap();
        assert_eq!(a.values, b.values);
        assert_ne!(a.id, b.id);
    }
}
