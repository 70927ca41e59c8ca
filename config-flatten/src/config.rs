//! Options controlling how documents are read and flattened.

/// Limits applied to every parse call.
///
/// Construct with [`Default`] and adjust individual fields:
///
/// ```rust
/// use config_flatten::FlattenOptions;
///
/// let mut options = FlattenOptions::default();
/// options.max_depth = 16;
/// options.max_alias_nodes = 10_000;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FlattenOptions {
    /// Maximum number of bytes read from a stream input (default: 10 MB).
    /// Text inputs are already in memory and are not checked.
    pub max_input_bytes: u64,
    /// Maximum container nesting depth below the root (default: 64).
    /// The root object or mapping is depth 1.
    pub max_depth: usize,
    /// Maximum number of nodes that YAML aliases may expand to, summed over
    /// the document (default: 1,000,000). Content written out in full is not
    /// counted; JSON has no aliases and is unaffected.
    pub max_alias_nodes: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: 10_485_760,
            max_depth: 64,
            max_alias_nodes: 1_000_000,
        }
    }
}
