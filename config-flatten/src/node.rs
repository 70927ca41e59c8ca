//! Format-independent document tree.
//!
//! Both format adapters translate their parser's tree into [`Node`] so a
//! single traversal serves every format.

use std::borrow::Cow;

/// A document node reduced to what flattening needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// Key/value entries in document order. Keys may repeat.
    Mapping(Vec<(Cow<'a, str>, Node<'a>)>),
    /// Items in document order.
    Sequence(Vec<Node<'a>>),
    /// A leaf value already rendered to its configuration text.
    Scalar(Cow<'a, str>),
    /// An explicit absence of value.
    Null,
}

impl<'a> Node<'a> {
    /// Build a scalar from anything string-like.
    #[must_use]
    pub fn scalar(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Scalar(text.into())
    }
}
