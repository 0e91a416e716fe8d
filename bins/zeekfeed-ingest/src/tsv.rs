//! Zeek TSV log reading: header directives + field alignment.
//!
//! A log starts with `#`-prefixed directives (`#separator`, `#set_separator`,
//! `#unset_field`, `#empty_field`, `#path`, `#fields`, `#types`, ...), then
//! one tab-separated line per event. This module turns those lines into the
//! engine's `RawLine`s — the header tells it which column is which.

use std::io::{self, BufRead};

use zeekfeed_api::field::SourceFormat;
use zeekfeed_engine::decoder::RawLine;

/// Parsed header state of one log file.
#[derive(Debug, Clone)]
pub struct TsvHeader {
    pub separator: char,
    pub set_separator: String,
    pub empty_field: String,
    pub unset_field: String,
    /// Record kind, from the `#path` directive.
    pub path: Option<String>,
    /// Declared column order.
    pub fields: Vec<String>,
}

impl Default for TsvHeader {
    fn default() -> Self {
        Self {
            separator: '\t',
            set_separator: ",".to_string(),
            empty_field: "(empty)".to_string(),
            unset_field: "-".to_string(),
            path: None,
            fields: Vec::new(),
        }
    }
}

impl TsvHeader {
    /// The codec dialect this file declares. Bool tokens aren't part of the
    /// header, so they come from the configured base format.
    pub fn source_format(&self, base: &SourceFormat) -> SourceFormat {
        SourceFormat {
            unset_field: self.unset_field.clone(),
            empty_field: self.empty_field.clone(),
            set_separator: self.set_separator.clone(),
            true_token: base.true_token.clone(),
            false_token: base.false_token.clone(),
        }
    }

    /// Apply one directive line (without the leading `#`).
    fn apply_directive(&mut self, rest: &str) {
        // `#separator` is special: its value follows a space, since the
        // separator itself isn't known yet.
        if let Some(value) = rest.strip_prefix("separator ") {
            self.separator = parse_separator(value);
            return;
        }

        let mut parts = rest.splitn(2, self.separator);
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            return;
        };
        match name {
            "set_separator" => self.set_separator = value.to_string(),
            "empty_field" => self.empty_field = value.to_string(),
            "unset_field" => self.unset_field = value.to_string(),
            "path" => self.path = Some(value.to_string()),
            "fields" => {
                self.fields = value.split(self.separator).map(str::to_string).collect();
            }
            // #open, #close, #types and anything newer are informational.
            _ => {}
        }
    }
}

/// Separator values arrive escaped: `\x09` for tab.
fn parse_separator(raw: &str) -> char {
    if raw == "\\t" {
        return '\t';
    }
    if let Some(hex) = raw.strip_prefix("\\x") {
        if let Ok(byte) = u8::from_str_radix(hex, 16) {
            return byte as char;
        }
    }
    raw.chars().next().unwrap_or('\t')
}

/// Streaming reader over one Zeek TSV log.
pub struct ZeekTsvReader<R> {
    reader: R,
    header: TsvHeader,
    pending: Option<String>,
}

impl<R: BufRead> ZeekTsvReader<R> {
    /// Consume header directives up to the first data line (stashed), so the
    /// caller can inspect `header()` before pulling lines.
    pub fn new(mut reader: R) -> io::Result<Self> {
        let mut header = TsvHeader::default();
        let mut pending = None;

        let mut buf = String::new();
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                break;
            }
            let line = buf.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix('#') {
                header.apply_directive(rest);
                continue;
            }
            pending = Some(line.to_string());
            break;
        }

        Ok(Self { reader, header, pending })
    }

    pub fn header(&self) -> &TsvHeader {
        &self.header
    }

    /// Next data line, aligned to the declared field order. Directive lines
    /// encountered mid-file (`#close`, a rotated header) are applied and
    /// skipped.
    pub fn next_line(&mut self) -> io::Result<Option<RawLine>> {
        loop {
            let line = match self.pending.take() {
                Some(line) => line,
                None => {
                    let mut buf = String::new();
                    if self.reader.read_line(&mut buf)? == 0 {
                        return Ok(None);
                    }
                    buf.trim_end_matches(['\r', '\n']).to_string()
                }
            };
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix('#') {
                self.header.apply_directive(rest);
                continue;
            }

            let pairs = self
                .header
                .fields
                .iter()
                .cloned()
                .zip(line.split(self.header.separator).map(str::to_string))
                .collect();
            return Ok(Some(RawLine::new(pairs)));
        }
    }
}
