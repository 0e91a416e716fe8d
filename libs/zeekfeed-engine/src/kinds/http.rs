//! Schema for HTTP request/response log entries.

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::field::FieldKind;
use zeekfeed_api::schema::RecordSchema;

fn collection(config: &CollectionsConfig) -> String {
    config.http_table.clone()
}

pub fn schema() -> RecordSchema {
    RecordSchema::new("http", collection)
        .required_field("ts", "ts", FieldKind::Time)
        .required_field("uid", "uid", FieldKind::Str)
        .required_field("id.orig_h", "id_orig_h", FieldKind::Addr)
        .required_field("id.orig_p", "id_orig_p", FieldKind::Port)
        .required_field("id.resp_h", "id_resp_h", FieldKind::Addr)
        .required_field("id.resp_p", "id_resp_p", FieldKind::Port)
        .field("trans_depth", "trans_depth", FieldKind::Count)
        .field("method", "method", FieldKind::Str)
        .field("host", "host", FieldKind::Str)
        .field("uri", "uri", FieldKind::Str)
        .field("referrer", "referrer", FieldKind::Str)
        .field("version", "version", FieldKind::Str)
        .field("user_agent", "user_agent", FieldKind::Str)
        .field("request_body_len", "request_body_len", FieldKind::Count)
        .field("response_body_len", "response_body_len", FieldKind::Count)
        .field("status_code", "status_code", FieldKind::Count)
        .field("status_msg", "status_msg", FieldKind::Str)
        .field("info_code", "info_code", FieldKind::Count)
        .field("info_msg", "info_msg", FieldKind::Str)
        .field("tags", "tags", FieldKind::Vector(Box::new(FieldKind::Enum)))
        .field("username", "username", FieldKind::Str)
        .field("proxied", "proxied", FieldKind::Vector(Box::new(FieldKind::Str)))
        .field("orig_fuids", "orig_fuids", FieldKind::Vector(Box::new(FieldKind::Str)))
        .field("orig_mime_types", "orig_mime_types", FieldKind::Vector(Box::new(FieldKind::Str)))
        .field("resp_fuids", "resp_fuids", FieldKind::Vector(Box::new(FieldKind::Str)))
        .field("resp_mime_types", "resp_mime_types", FieldKind::Vector(Box::new(FieldKind::Str)))
        .hashed_index("id_orig_h")
        .hashed_index("id_resp_h")
        .hashed_index("host")
}
