//! The shared flattening traversal.

use crate::flat::FlatMap;
use crate::node::Node;
use crate::path::PathBuilder;

/// Flatten a node tree into configuration keys.
///
/// Every leaf is recorded under the `:`-joined path of its ancestors' keys and
/// indices. A path that was already recorded, in any letter case, keeps its
/// first value. This never fails; shape checks belong to the format adapters.
#[must_use]
pub fn flatten(root: &Node<'_>) -> FlatMap {
    let mut data = FlatMap::new();
    let mut path = PathBuilder::new();
    visit(root, &mut path, &mut data);
    data
}

fn visit(node: &Node<'_>, path: &mut PathBuilder, data: &mut FlatMap) {
    match node {
        Node::Mapping(entries) => {
            for (key, value) in entries {
                path.push(key);
                visit(value, path, data);
                path.pop();
            }
        }
        Node::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                visit(item, path, data);
                path.pop();
            }
        }
        Node::Scalar(text) => record(path, Some(text.clone().into_owned()), data),
        Node::Null => record(path, None, data),
    }
}

fn record(path: &PathBuilder, value: Option<String>, data: &mut FlatMap) {
    if !data.insert_if_absent(path.as_str(), value) {
        tracing::trace!(path = path.as_str(), "duplicate configuration key ignored");
    }
}
