//! The flattened result of a parse.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Simple uppercase mapping of one character.
///
/// Characters whose uppercase form is more than one character (`ß` to `SS`)
/// are left unchanged, so folding never changes a key's length.
fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Ordinal comparison of two keys without regard to case.
fn cmp_folded(a: &str, b: &str) -> Ordering {
    a.chars().map(fold_char).cmp(b.chars().map(fold_char))
}

/// A configuration key compared ordinally without regard to case.
///
/// Equality and ordering compare the simple uppercase form of each character,
/// so `Object:String` and `object:string` are the same key. The original
/// spelling is kept for display.
#[derive(Debug, Clone)]
struct CaseInsensitiveKey(String);

impl PartialEq for CaseInsensitiveKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CaseInsensitiveKey {}

impl PartialOrd for CaseInsensitiveKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CaseInsensitiveKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_folded(&self.0, &other.0)
    }
}

/// Borrowed view of a key, so lookups by `&str` need no allocation.
///
/// Ordering on `dyn KeyText` must match [`CaseInsensitiveKey`] for the
/// `Borrow` contract of `BTreeMap` to hold.
trait KeyText {
    fn text(&self) -> &str;
}

impl KeyText for CaseInsensitiveKey {
    fn text(&self) -> &str {
        &self.0
    }
}

impl KeyText for &str {
    fn text(&self) -> &str {
        self
    }
}

impl<'a> Borrow<dyn KeyText + 'a> for CaseInsensitiveKey {
    fn borrow(&self) -> &(dyn KeyText + 'a) {
        self
    }
}

impl PartialEq for dyn KeyText + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for dyn KeyText + '_ {}

impl PartialOrd for dyn KeyText + '_ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for dyn KeyText + '_ {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_folded(self.text(), other.text())
    }
}

/// Flat mapping from configuration key to optional value.
///
/// - Keys compare case-insensitively and iterate in ascending order.
/// - The first value written for a key wins; later writes are ignored and the
///   first spelling of the key is kept.
/// - `None` marks an explicit null, which is distinct from an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatMap {
    entries: BTreeMap<CaseInsensitiveKey, Option<String>>,
}

impl FlatMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless an equal key is already present.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: Option<String>) -> bool {
        match self.entries.entry(CaseInsensitiveKey(key.into())) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Look up a key. The outer `Option` is presence, the inner one the value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .get(&key as &dyn KeyText)
            .map(Option::as_deref)
    }

    /// Look up a key that must hold a non-null value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key as &dyn KeyText)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending case-insensitive key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Keys in ascending case-insensitive order, as first written.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.0.as_str())
    }

    /// Convert into a plain map keyed by the stored spelling.
    ///
    /// The returned map compares keys case-sensitively.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Option<String>> {
        self.entries.into_iter().map(|(k, v)| (k.0, v)).collect()
    }
}

/// Borrowing iterator over a [`FlatMap`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, CaseInsensitiveKey, Option<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(k, v)| (k.0.as_str(), v.as_deref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a FlatMap {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a [`FlatMap`].
#[derive(Debug)]
pub struct IntoIter {
    inner: btree_map::IntoIter<CaseInsensitiveKey, Option<String>>,
}

impl Iterator for IntoIter {
    type Item = (String, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.0, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for FlatMap {
    type Item = (String, Option<String>);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for FlatMap {
    /// Collect entries with first-write-wins semantics.
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert_if_absent(key, value);
        }
        map
    }
}

impl Serialize for FlatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}
