//! Text parsers for workspace artifacts
//!
//! Markdown instruction files are split into lines and a flat list of
//! heading-delimited sections. JSON runtime configs are parsed on demand
//! by the runtime rules (see `rules::config_source`).

pub mod markdown;
