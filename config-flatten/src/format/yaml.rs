//! YAML adapter.
//!
//! `yaml-rust2`'s event parser is driven directly so every scalar keeps its
//! literal text and style; the resolved `Yaml` values would already have
//! rewritten `True`, `0x10` or `1.50`. Events are assembled into a small
//! [`YamlNode`] tree per document, then translated into [`Node`]s.
//!
//! Anchored nodes are shared between their definition and every alias, so
//! building the tree is linear in the input. Expansion happens only during
//! translation, where nodes reached through aliases are counted against
//! [`FlattenOptions::max_alias_nodes`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::config::FlattenOptions;
use crate::error::{FormatError, ParseError};
use crate::flat::FlatMap;
use crate::flatten::flatten;
use crate::format::input::{read_text, strip_bom};
use crate::node::Node;

/// Handle that tags from the YAML core schema (`!!null`, `!!str`, ...) resolve to.
const CORE_SCHEMA_HANDLE: &str = "tag:yaml.org,2002:";

/// Flatten a YAML stream given as text. The stream must hold one document.
///
/// # Errors
///
/// Returns `ParseError::Yaml` for malformed YAML and `ParseError::Format` if
/// the stream holds zero or several documents, the root is not a mapping, or
/// the document nests deeper than allowed.
pub fn flatten_yaml_str(text: &str, options: &FlattenOptions) -> Result<FlatMap, ParseError> {
    let documents = load_documents(strip_bom(text))?;
    flatten_documents(documents, options)
}

/// Flatten a YAML stream read to completion from `reader`.
///
/// # Errors
///
/// As [`flatten_yaml_str`], plus `ParseError::Io`,
/// `ParseError::InputTooLarge` and `ParseError::InvalidEncoding` from reading
/// the stream.
pub fn flatten_yaml_reader<R: Read>(
    reader: R,
    options: &FlattenOptions,
) -> Result<FlatMap, ParseError> {
    let text = read_text(reader, options.max_input_bytes)?;
    let documents = load_documents(&text)?;
    flatten_documents(documents, options)
}

fn flatten_documents(
    mut documents: Vec<YamlNode>,
    options: &FlattenOptions,
) -> Result<FlatMap, ParseError> {
    if documents.len() != 1 {
        tracing::debug!(
            documents = documents.len(),
            "rejecting YAML stream without exactly one document"
        );
        return Err(FormatError::YamlDocumentCount(documents.len()).into());
    }

    let Some(root) = documents.pop() else {
        return Err(FormatError::YamlDocumentCount(0).into());
    };
    if !matches!(root.resolved(), YamlNode::Mapping(_)) {
        tracing::debug!("rejecting YAML document with non-mapping root");
        return Err(FormatError::YamlRoot.into());
    }

    let mut translator = Translator::new(options);
    let root = translator.translate(&root, 1, false)?;
    if translator.alias_nodes > 0 {
        tracing::debug!(
            alias_nodes = translator.alias_nodes,
            "expanded YAML aliases"
        );
    }
    let data = flatten(&root);
    tracing::debug!(entries = data.len(), "flattened YAML document");
    Ok(data)
}

/// A YAML node as written, before any scalar resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlNode {
    Scalar {
        value: String,
        style: TScalarStyle,
        tag: Option<Tag>,
    },
    Sequence(Vec<YamlNode>),
    Mapping(Vec<(YamlNode, YamlNode)>),
    /// The definition of an anchored node.
    Anchor(Rc<YamlNode>),
    /// A reference to an earlier anchored node.
    Alias(Rc<YamlNode>),
}

impl YamlNode {
    /// The content node behind any anchor or alias.
    fn resolved(&self) -> &YamlNode {
        match self {
            Self::Anchor(inner) | Self::Alias(inner) => inner.resolved(),
            _ => self,
        }
    }

    /// Whether this scalar stands for "no value".
    ///
    /// Untagged plain scalars spelled as a core schema null (empty, `~`,
    /// `null`, `Null`, `NULL`) and scalars tagged `!!null` are null. Quoted
    /// scalars never are, so `""` stays an empty string.
    ///
    /// This follows core schema resolution, which is broader than reading the
    /// raw scalar text: a raw reader keeps plain `null` and `~` as those
    /// strings and treats only the empty plain scalar as absent.
    fn is_null(&self) -> bool {
        let Self::Scalar { value, style, tag } = self else {
            return false;
        };
        match tag {
            Some(tag) => is_core_tag(tag, "null"),
            None => {
                *style == TScalarStyle::Plain
                    && matches!(value.as_str(), "" | "~" | "null" | "Null" | "NULL")
            }
        }
    }
}

fn is_core_tag(tag: &Tag, suffix: &str) -> bool {
    (tag.handle == CORE_SCHEMA_HANDLE || tag.handle == "!!") && tag.suffix == suffix
}

/// Parse every document in a YAML stream.
///
/// # Errors
///
/// Returns the scanner error for malformed YAML.
pub fn load_documents(text: &str) -> Result<Vec<YamlNode>, ParseError> {
    let mut parser = Parser::new_from_str(text);
    let mut builder = DocumentBuilder::default();
    parser.load(&mut builder, true)?;
    Ok(builder.documents)
}

/// Collection under construction.
#[derive(Debug)]
enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<YamlNode>,
    },
    Mapping {
        anchor: usize,
        entries: Vec<(YamlNode, YamlNode)>,
        pending_key: Option<YamlNode>,
    },
}

/// Event receiver assembling one [`YamlNode`] tree per document.
#[derive(Debug, Default)]
struct DocumentBuilder {
    stack: Vec<Frame>,
    /// Completed anchored nodes, by the parser's anchor id.
    anchors: HashMap<usize, Rc<YamlNode>>,
    documents: Vec<YamlNode>,
}

impl DocumentBuilder {
    fn complete(&mut self, node: YamlNode, anchor: usize) {
        // Anchor id 0 means the node has no anchor.
        let node = if anchor == 0 {
            node
        } else {
            let shared = Rc::new(node);
            self.anchors.insert(anchor, Rc::clone(&shared));
            YamlNode::Anchor(shared)
        };

        match self.stack.last_mut() {
            None => self.documents.push(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
        }
    }

    fn end_collection(&mut self) {
        match self.stack.pop() {
            Some(Frame::Sequence { anchor, items }) => {
                self.complete(YamlNode::Sequence(items), anchor);
            }
            Some(Frame::Mapping {
                anchor, entries, ..
            }) => self.complete(YamlNode::Mapping(entries), anchor),
            None => {}
        }
    }
}

impl MarkedEventReceiver for DocumentBuilder {
    fn on_event(&mut self, ev: Event, _mark: Marker) {
        match ev {
            Event::Scalar(value, style, anchor, tag) => {
                self.complete(YamlNode::Scalar { value, style, tag }, anchor);
            }
            Event::SequenceStart(anchor, _tag) => self.stack.push(Frame::Sequence {
                anchor,
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, _tag) => self.stack.push(Frame::Mapping {
                anchor,
                entries: Vec::new(),
                pending_key: None,
            }),
            Event::SequenceEnd | Event::MappingEnd => self.end_collection(),
            Event::Alias(id) => {
                // The parser rejects unknown anchors; an anchor referenced from
                // inside its own node is still open here and reads as null.
                let node = match self.anchors.get(&id) {
                    Some(target) => YamlNode::Alias(Rc::clone(target)),
                    None => YamlNode::Scalar {
                        value: String::new(),
                        style: TScalarStyle::Plain,
                        tag: None,
                    },
                };
                self.complete(node, 0);
            }
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}
        }
    }
}

/// Translates [`YamlNode`] trees into [`Node`]s under the configured limits.
struct Translator {
    max_depth: usize,
    max_alias_nodes: usize,
    /// Nodes produced so far by expanding aliases.
    alias_nodes: usize,
}

impl Translator {
    fn new(options: &FlattenOptions) -> Self {
        Self {
            max_depth: options.max_depth,
            max_alias_nodes: options.max_alias_nodes,
            alias_nodes: 0,
        }
    }

    /// Count one node against the alias budget if it was reached through an
    /// alias.
    fn charge(&mut self, via_alias: bool) -> Result<(), FormatError> {
        if !via_alias {
            return Ok(());
        }
        self.alias_nodes += 1;
        if self.alias_nodes > self.max_alias_nodes {
            tracing::debug!(
                limit = self.max_alias_nodes,
                "rejecting YAML document with excessive alias expansion"
            );
            return Err(FormatError::AliasExpansionExceeded(self.max_alias_nodes));
        }
        Ok(())
    }

    /// Translate a YAML node into a generic node.
    ///
    /// `depth` is the container depth of `node` if it is a collection.
    /// `via_alias` is set below an alias, where every node is charged.
    fn translate<'a>(
        &mut self,
        node: &'a YamlNode,
        depth: usize,
        via_alias: bool,
    ) -> Result<Node<'a>, FormatError> {
        match node {
            YamlNode::Anchor(inner) => self.translate(inner, depth, via_alias),
            YamlNode::Alias(inner) => self.translate(inner, depth, true),
            YamlNode::Mapping(entries) => {
                self.charge(via_alias)?;
                check_depth(depth, self.max_depth)?;
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.key_text(key, via_alias)?;
                    out.push((key, self.translate(value, depth + 1, via_alias)?));
                }
                Ok(Node::Mapping(out))
            }
            YamlNode::Sequence(items) => {
                self.charge(via_alias)?;
                check_depth(depth, self.max_depth)?;
                let nodes = items
                    .iter()
                    .map(|item| self.translate(item, depth + 1, via_alias))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::Sequence(nodes))
            }
            YamlNode::Scalar { value, .. } => {
                self.charge(via_alias)?;
                if node.is_null() {
                    Ok(Node::Null)
                } else {
                    Ok(Node::Scalar(Cow::Borrowed(value.as_str())))
                }
            }
        }
    }

    /// Text used when `node` is a mapping key.
    ///
    /// Scalars use their literal text; collection keys use a compact flow form.
    fn key_text<'a>(
        &mut self,
        node: &'a YamlNode,
        via_alias: bool,
    ) -> Result<Cow<'a, str>, FormatError> {
        match node {
            YamlNode::Anchor(inner) => self.key_text(inner, via_alias),
            YamlNode::Alias(inner) => self.key_text(inner, true),
            YamlNode::Scalar { value, .. } => {
                self.charge(via_alias)?;
                Ok(Cow::Borrowed(value.as_str()))
            }
            YamlNode::Sequence(items) => {
                self.charge(via_alias)?;
                let items = items
                    .iter()
                    .map(|item| self.key_text(item, via_alias))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Cow::Owned(format!("[{}]", items.join(", "))))
            }
            YamlNode::Mapping(entries) => {
                self.charge(via_alias)?;
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.key_text(key, via_alias)?;
                    let value = self.key_text(value, via_alias)?;
                    parts.push(format!("{key}: {value}"));
                }
                Ok(Cow::Owned(format!("{{{}}}", parts.join(", "))))
            }
        }
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), FormatError> {
    if depth > max_depth {
        return Err(FormatError::DepthExceeded(max_depth));
    }
    Ok(())
}
