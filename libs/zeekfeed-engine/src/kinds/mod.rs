//! Built-in record kinds, one module per log type.
//!
//! Each module exports a single `schema()` — the kind exists entirely as
//! constructed data. Adding a kind is adding a module here and registering
//! it; the decoder, router, and pipeline never change.

pub mod conn;
pub mod dns;
pub mod http;
