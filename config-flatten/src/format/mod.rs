//! Format adapters.
//!
//! Each adapter parses one document format, checks the document shape and
//! translates the parser's tree into [`crate::Node`]s for the shared traversal:
//! - `json`: `serde_json` value tree
//! - `yaml`: `yaml-rust2` event stream
//! - `input`: bounded stream reading shared by both

pub mod input;
pub mod json;
pub mod yaml;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`json`, `yaml`, `yml`), ignoring case.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}
