use serde::Deserialize;

fn default_dns_table() -> String {
    "dns".to_string()
}

fn default_conn_table() -> String {
    "conn".to_string()
}

fn default_http_table() -> String {
    "http".to_string()
}

/// Destination collection names, one per record kind. This is what a
/// schema's collection resolver reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "default_dns_table")]
    pub dns_table: String,

    #[serde(default = "default_conn_table")]
    pub conn_table: String,

    #[serde(default = "default_http_table")]
    pub http_table: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            dns_table: default_dns_table(),
            conn_table: default_conn_table(),
            http_table: default_http_table(),
        }
    }
}
