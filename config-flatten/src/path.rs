//! Configuration key paths.
//!
//! A path is a stack of segments (mapping keys or sequence indices) rendered
//! as one string joined with [`KEY_DELIMITER`]. Segments are never escaped, so
//! a key that itself contains `:` cannot be told apart from a path boundary.

/// Separator placed between path segments.
pub const KEY_DELIMITER: &str = ":";

/// Join segments into a single key, root first.
///
/// ```rust
/// use config_flatten::path::combine;
///
/// assert_eq!(combine(["Logging", "LogLevel", "Default"]), "Logging:LogLevel:Default");
/// assert_eq!(combine(Vec::<&str>::new()), "");
/// ```
#[must_use]
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_DELIMITER);
        }
        key.push_str(segment.as_ref());
    }
    key
}

/// The current position of a tree walk.
///
/// The rendered key is kept up to date incrementally: a push appends the
/// delimiter and the segment, a pop truncates back to where that push started.
/// The result is always identical to [`combine`] over the live segments.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    rendered: String,
    /// Length of `rendered` before each live segment was pushed.
    marks: Vec<usize>,
}

impl PathBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key segment.
    pub fn push(&mut self, segment: &str) {
        self.marks.push(self.rendered.len());
        if self.marks.len() > 1 {
            self.rendered.push_str(KEY_DELIMITER);
        }
        self.rendered.push_str(segment);
    }

    /// Append a zero-based sequence index as a decimal segment.
    pub fn push_index(&mut self, index: usize) {
        self.push(&index.to_string());
    }

    /// Remove the most recently pushed segment.
    ///
    /// # Panics
    ///
    /// Panics if no segment has been pushed. A balanced walk never does this.
    pub fn pop(&mut self) {
        let Some(mark) = self.marks.pop() else {
            panic!("PathBuilder::pop called on an empty path");
        };
        self.rendered.truncate(mark);
    }

    /// The rendered key; the empty string at the root.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}
