//! JSON adapter.
//!
//! Parses with `serde_json` into a [`JsonTree`] that keeps every object member
//! in document order, repeated names included, and translates it into
//! [`Node`]s. Number literals keep their exact text (the workspace enables
//! `arbitrary_precision`).

use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::config::FlattenOptions;
use crate::error::{FormatError, JsonKind, ParseError};
use crate::flat::FlatMap;
use crate::flatten::flatten;
use crate::format::input::{read_bounded, strip_bom, strip_bom_bytes};
use crate::node::Node;

/// Key under which `serde_json` hands an `arbitrary_precision` number to a
/// visitor as a single-entry map.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Flatten a JSON document given as text.
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON and `ParseError::Format` if
/// the root is not an object or the document nests deeper than allowed.
pub fn flatten_json_str(text: &str, options: &FlattenOptions) -> Result<FlatMap, ParseError> {
    let tree: JsonTree = serde_json::from_str(strip_bom(text))?;
    flatten_json_tree(&tree, options)
}

/// Flatten a JSON document read to completion from `reader`.
///
/// # Errors
///
/// As [`flatten_json_str`], plus `ParseError::Io` and
/// `ParseError::InputTooLarge` from reading the stream.
pub fn flatten_json_reader<R: Read>(
    reader: R,
    options: &FlattenOptions,
) -> Result<FlatMap, ParseError> {
    let bytes = read_bounded(reader, options.max_input_bytes)?;
    let tree: JsonTree = serde_json::from_slice(strip_bom_bytes(&bytes))?;
    flatten_json_tree(&tree, options)
}

fn flatten_json_tree(tree: &JsonTree, options: &FlattenOptions) -> Result<FlatMap, ParseError> {
    let kind = tree.kind();
    if kind != JsonKind::Object {
        tracing::debug!(%kind, "rejecting JSON document with non-object root");
        return Err(FormatError::JsonRoot(kind).into());
    }

    let root = to_node(tree, 1, options.max_depth)?;
    let data = flatten(&root);
    tracing::debug!(entries = data.len(), "flattened JSON document");
    Ok(data)
}

/// A parsed JSON value as written.
///
/// Unlike `serde_json::Value`, objects are member lists: a repeated member
/// name is kept, so the flattened result can apply first-write-wins to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonTree {
    Object(Vec<(String, JsonTree)>),
    Array(Vec<JsonTree>),
    String(String),
    /// The number literal's text.
    Number(String),
    Bool(bool),
    Null,
}

impl JsonTree {
    #[must_use]
    pub fn kind(&self) -> JsonKind {
        match self {
            Self::Object(_) => JsonKind::Object,
            Self::Array(_) => JsonKind::Array,
            Self::String(_) => JsonKind::String,
            Self::Number(_) => JsonKind::Number,
            Self::Bool(true) => JsonKind::True,
            Self::Bool(false) => JsonKind::False,
            Self::Null => JsonKind::Null,
        }
    }
}

impl<'de> Deserialize<'de> for JsonTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonTreeVisitor)
    }
}

struct JsonTreeVisitor;

impl<'de> Visitor<'de> for JsonTreeVisitor {
    type Value = JsonTree;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<JsonTree, E> {
        Ok(JsonTree::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<JsonTree, E> {
        Ok(JsonTree::Number(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<JsonTree, E> {
        Ok(JsonTree::Number(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<JsonTree, E> {
        Ok(JsonTree::Number(value.to_string()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<JsonTree, E> {
        Ok(JsonTree::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<JsonTree, E> {
        Ok(JsonTree::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonTree, E> {
        Ok(JsonTree::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonTree, E> {
        Ok(JsonTree::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonTree, D::Error> {
        JsonTree::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonTree, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonTree::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonTree, A::Error> {
        let mut members: Vec<(String, JsonTree)> = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if members.is_empty() && key == NUMBER_TOKEN {
                return Ok(JsonTree::Number(map.next_value()?));
            }
            members.push((key, map.next_value()?));
        }
        Ok(JsonTree::Object(members))
    }
}

/// Translate a JSON tree into a generic node.
///
/// `depth` is the container depth of `tree` if it is a container.
fn to_node(tree: &JsonTree, depth: usize, max_depth: usize) -> Result<Node<'_>, FormatError> {
    match tree {
        JsonTree::Object(members) => {
            check_depth(depth, max_depth)?;
            let mut entries = Vec::with_capacity(members.len());
            for (key, child) in members {
                entries.push((Cow::Borrowed(key.as_str()), to_node(child, depth + 1, max_depth)?));
            }
            Ok(Node::Mapping(entries))
        }
        JsonTree::Array(items) => {
            check_depth(depth, max_depth)?;
            let nodes = items
                .iter()
                .map(|item| to_node(item, depth + 1, max_depth))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Sequence(nodes))
        }
        JsonTree::String(text) | JsonTree::Number(text) => {
            Ok(Node::Scalar(Cow::Borrowed(text.as_str())))
        }
        JsonTree::Bool(b) => Ok(Node::Scalar(Cow::Borrowed(if *b { "true" } else { "false" }))),
        JsonTree::Null => Ok(Node::Null),
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), FormatError> {
    if depth > max_depth {
        return Err(FormatError::DepthExceeded(max_depth));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(text: &str) -> Result<FlatMap, ParseError> {
        flatten_json_str(text, &FlattenOptions::default())
    }

    fn create_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_scalar_stringification() {
        let data = parse(r#"{"a": 1, "b": true, "c": null, "d": false, "e": "Text"}"#).unwrap();
        assert_eq!(data.get("a"), Some(Some("1")));
        assert_eq!(data.get("b"), Some(Some("true")));
        assert_eq!(data.get("c"), Some(None));
        assert_eq!(data.get("d"), Some(Some("false")));
        assert_eq!(data.get("e"), Some(Some("Text")), "strings are not case-folded");
    }

    #[test]
    fn test_number_literals_are_preserved() {
        let data = parse(r#"{"f": 1.50, "e": 1e3, "neg": -0, "big": 123456789012345678901234567890}"#)
            .unwrap();
        assert_eq!(data.get_str("f"), Some("1.50"));
        assert_eq!(data.get_str("e"), Some("1e3"));
        assert_eq!(data.get_str("neg"), Some("-0"));
        assert_eq!(data.get_str("big"), Some("123456789012345678901234567890"));
    }

    #[test]
    fn test_nested_array_of_objects() {
        let data = parse(r#"{"arr": [{"x": "v"}]}"#).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get_str("arr:0:x"), Some("v"));
    }

    #[test]
    fn test_empty_string_is_not_null() {
        let data = parse(r#"{"empty": ""}"#).unwrap();
        assert_eq!(data.get("empty"), Some(Some("")));
    }

    #[test]
    fn test_empty_object_is_empty_result() {
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_array_root_is_rejected() {
        let err = parse("[1,2,3]").unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON object, got: Array");
        assert_eq!(
            err.as_format(),
            Some(&FormatError::JsonRoot(JsonKind::Array))
        );
    }

    #[test]
    fn test_scalar_and_null_roots_are_rejected() {
        for (text, kind) in [
            ("\"s\"", JsonKind::String),
            ("42", JsonKind::Number),
            ("true", JsonKind::True),
            ("false", JsonKind::False),
            ("null", JsonKind::Null),
        ] {
            let err = parse(text).unwrap_err();
            assert_eq!(err.as_format(), Some(&FormatError::JsonRoot(kind)), "root {text}");
        }
    }

    #[test]
    fn test_invalid_json_is_syntax_error() {
        let err = parse("definitely not json").unwrap_err();
        assert!(err.is_syntax(), "got: {err:?}");
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_trailing_content_is_syntax_error() {
        let err = parse(r#"{"a": 1} {"b": 2}"#).unwrap_err();
        assert!(err.is_syntax(), "got: {err:?}");
    }

    #[test]
    fn test_repeated_member_name_keeps_first_value() {
        let data = parse(r#"{"a": "first", "a": "second"}"#).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get_str("a"), Some("first"));

        let data = parse(r#"{"o": {"k": null}, "o": {"k": "late", "extra": 1}}"#).unwrap();
        assert_eq!(data.get("o:k"), Some(None), "the first null must not be replaced");
        assert_eq!(data.get_str("o:extra"), Some("1"));
    }

    #[test]
    fn test_tree_keeps_member_order_and_repeats() {
        let tree: JsonTree = serde_json::from_str(r#"{"b": 1, "a": [true, null], "b": "x"}"#)
            .unwrap();
        let JsonTree::Object(members) = tree else {
            panic!("expected an object, got {tree:?}");
        };
        let names: Vec<&str> = members.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert_eq!(members[0].1, JsonTree::Number("1".to_owned()));
        assert_eq!(
            members[1].1,
            JsonTree::Array(vec![JsonTree::Bool(true), JsonTree::Null])
        );
        assert_eq!(members[2].1, JsonTree::String("x".to_owned()));
    }

    #[test]
    fn test_tree_kind() {
        let cases = [
            ("{}", JsonKind::Object),
            ("[]", JsonKind::Array),
            ("\"s\"", JsonKind::String),
            ("1.5", JsonKind::Number),
            ("true", JsonKind::True),
            ("false", JsonKind::False),
            ("null", JsonKind::Null),
        ];
        for (text, expected) in cases {
            let tree: JsonTree = serde_json::from_str(text).unwrap();
            assert_eq!(tree.kind(), expected, "kind of {text}");
        }
    }

    #[test]
    fn test_case_variant_members_keep_first() {
        let data = parse(r#"{"Key": "first", "KEY": "second"}"#).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get_str("key"), Some("first"));
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["Key"]);
    }

    #[test]
    fn test_depth_limit() {
        let mut options = FlattenOptions::default();
        options.max_depth = 2;

        let ok = flatten_json_str(r#"{"a": {"b": 1}}"#, &options).unwrap();
        assert_eq!(ok.get_str("a:b"), Some("1"));

        let err = flatten_json_str(r#"{"a": {"b": [1]}}"#, &options).unwrap_err();
        assert_eq!(err.as_format(), Some(&FormatError::DepthExceeded(2)));
    }

    #[test]
    fn test_bom_is_ignored() {
        let data = parse("\u{feff}{\"a\": \"b\"}").unwrap();
        assert_eq!(data.get_str("a"), Some("b"));

        let data =
            flatten_json_reader(&b"\xEF\xBB\xBF{\"a\": \"b\"}"[..], &FlattenOptions::default())
                .unwrap();
        assert_eq!(data.get_str("a"), Some("b"));
    }

    #[test]
    fn test_reader_from_file() {
        let file = create_temp_json(r#"{"outer": {"inner": [true, null]}}"#);
        let reader = std::fs::File::open(file.path()).unwrap();
        let data = flatten_json_reader(reader, &FlattenOptions::default()).unwrap();
        assert_eq!(data.get("outer:inner:0"), Some(Some("true")));
        assert_eq!(data.get("outer:inner:1"), Some(None));
    }

    #[test]
    fn test_reader_invalid_json_is_syntax_error() {
        let err = flatten_json_reader(&b"definitely not json"[..], &FlattenOptions::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)), "got: {err:?}");
    }

    #[test]
    fn test_reader_size_limit() {
        let mut options = FlattenOptions::default();
        options.max_input_bytes = 8;
        let err = flatten_json_reader(&br#"{"key": "value"}"#[..], &options).unwrap_err();
        assert!(
            matches!(err, ParseError::InputTooLarge { limit: 8 }),
            "got: {err:?}"
        );
    }
}
