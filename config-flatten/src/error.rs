//! Error types for document flattening.

use std::fmt;

use thiserror::Error;

/// The kind of a JSON value, named the way parse diagnostics report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    True,
    False,
    Null,
}

impl JsonKind {
    /// The kind's name as it appears in error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Array => "Array",
            Self::String => "String",
            Self::Number => "Number",
            Self::True => "True",
            Self::False => "False",
            Self::Null => "Null",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that parsed cleanly but does not have a flattenable shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The JSON root is not an object.
    #[error("expected a JSON object, got: {0}")]
    JsonRoot(JsonKind),

    /// The YAML stream does not hold exactly one document.
    #[error("expected 1 YAML document, got: {0}")]
    YamlDocumentCount(usize),

    /// The YAML document root is not a mapping.
    #[error("expected the root node to be a YAML object")]
    YamlRoot,

    /// Containers are nested deeper than the configured limit.
    #[error("document nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    /// YAML aliases expand to more nodes than the configured limit.
    #[error("alias expansion exceeds the maximum of {0} nodes")]
    AliasExpansionExceeded(usize),
}

/// Any failure of a single parse call. No partial result is ever returned.
///
/// Syntax errors from the underlying parsers are carried unchanged so their
/// diagnostics (line, column, reason) reach the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input is not well-formed JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The input is not well-formed YAML.
    #[error(transparent)]
    Yaml(#[from] yaml_rust2::ScanError),

    /// The input parsed but has the wrong shape.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The input stream could not be read.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The input stream is larger than `max_input_bytes`.
    #[error("input exceeds the maximum size of {limit} bytes")]
    InputTooLarge {
        /// The configured limit in bytes.
        limit: u64,
    },

    /// The input stream is not valid UTF-8.
    #[error("input is not valid UTF-8")]
    InvalidEncoding,
}

impl ParseError {
    /// Whether the input was rejected by the underlying JSON or YAML parser.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Yaml(_))
    }

    /// Whether the input parsed but failed a structural check.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// The structural error, if this is one.
    #[must_use]
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}
