//! Schema for DNS transaction log entries.

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::field::FieldKind;
use zeekfeed_api::schema::RecordSchema;

fn collection(config: &CollectionsConfig) -> String {
    config.dns_table.clone()
}

/// One entry per DNS query/response pair observed by the monitor.
///
/// `ts`, `uid` and the connection 4-tuple are always emitted by the source;
/// everything else is optional and unsets to its kind's zero value. The
/// hashed indices back the equality lookups the analysis side runs against
/// source address, responder address, and query name.
pub fn schema() -> RecordSchema {
    RecordSchema::new("dns", collection)
        .required_field("ts", "ts", FieldKind::Time)
        .required_field("uid", "uid", FieldKind::Str)
        .required_field("id.orig_h", "id_orig_h", FieldKind::Addr)
        .required_field("id.orig_p", "id_orig_p", FieldKind::Port)
        .required_field("id.resp_h", "id_resp_h", FieldKind::Addr)
        .required_field("id.resp_p", "id_resp_p", FieldKind::Port)
        .field("proto", "proto", FieldKind::Enum)
        .field("trans_id", "trans_id", FieldKind::Count)
        .field("rtt", "RTT", FieldKind::Interval)
        .field("query", "query", FieldKind::Str)
        .field("qclass", "qclass", FieldKind::Count)
        .field("qclass_name", "qclass_name", FieldKind::Str)
        .field("qtype", "qtype", FieldKind::Count)
        .field("qtype_name", "qtype_name", FieldKind::Str)
        .field("rcode", "rcode", FieldKind::Count)
        .field("rcode_name", "rcode_name", FieldKind::Str)
        .field("AA", "AA", FieldKind::Bool)
        .field("TC", "TC", FieldKind::Bool)
        .field("RD", "RD", FieldKind::Bool)
        .field("RA", "RA", FieldKind::Bool)
        .field("Z", "Z", FieldKind::Count)
        .field("answers", "answers", FieldKind::Vector(Box::new(FieldKind::Str)))
        .field("TTLs", "TTLs", FieldKind::Vector(Box::new(FieldKind::Interval)))
        .field("rejected", "rejected", FieldKind::Bool)
        .hashed_index("id_orig_h")
        .hashed_index("id_resp_h")
        .hashed_index("query")
}
