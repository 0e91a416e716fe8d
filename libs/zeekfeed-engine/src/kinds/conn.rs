//! Schema for connection summary log entries.

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::field::FieldKind;
use zeekfeed_api::schema::RecordSchema;

fn collection(config: &CollectionsConfig) -> String {
    config.conn_table.clone()
}

/// One entry per transport-layer connection.
pub fn schema() -> RecordSchema {
    RecordSchema::new("conn", collection)
        .required_field("ts", "ts", FieldKind::Time)
        .required_field("uid", "uid", FieldKind::Str)
        .required_field("id.orig_h", "id_orig_h", FieldKind::Addr)
        .required_field("id.orig_p", "id_orig_p", FieldKind::Port)
        .required_field("id.resp_h", "id_resp_h", FieldKind::Addr)
        .required_field("id.resp_p", "id_resp_p", FieldKind::Port)
        .field("proto", "proto", FieldKind::Enum)
        .field("service", "service", FieldKind::Str)
        .field("duration", "duration", FieldKind::Interval)
        .field("orig_bytes", "orig_bytes", FieldKind::Count)
        .field("resp_bytes", "resp_bytes", FieldKind::Count)
        .field("conn_state", "conn_state", FieldKind::Str)
        .field("local_orig", "local_orig", FieldKind::Bool)
        .field("local_resp", "local_resp", FieldKind::Bool)
        .field("missed_bytes", "missed_bytes", FieldKind::Count)
        .field("history", "history", FieldKind::Str)
        .field("orig_pkts", "orig_pkts", FieldKind::Count)
        .field("orig_ip_bytes", "orig_ip_bytes", FieldKind::Count)
        .field("resp_pkts", "resp_pkts", FieldKind::Count)
        .field("resp_ip_bytes", "resp_ip_bytes", FieldKind::Count)
        .field("tunnel_parents", "tunnel_parents", FieldKind::Vector(Box::new(FieldKind::Str)))
        .hashed_index("id_orig_h")
        .hashed_index("id_resp_h")
        .index("ts")
        .index("uid")
}
