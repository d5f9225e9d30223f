//! IRCv3 message tags and tag value escaping.

use std::fmt::{Result as FmtResult, Write};

/// Escape a tag value for serialization.
///
/// Escapes special characters according to the IRCv3 message-tags spec.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Unescape a tag value from wire format.
///
/// Reverses [`escape_tag_value`]. Unknown escapes keep the escaped
/// character and a lone trailing backslash is dropped; this never fails.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// The tags of one message, in the order they were set.
///
/// Keys are unique. [`get`](Tags::get) reads an absent tag and a tag with an
/// empty value the same way; use [`has`](Tags::has) to tell them apart.
///
/// ```
/// use slirc_conn::Tags;
///
/// let mut tags = Tags::new();
/// tags.set("+typing", "");
/// tags.set("msgid", "abc");
/// assert!(tags.has("+typing"));
/// assert_eq!(tags.get("+typing"), "");
/// assert_eq!(tags.get("time"), "");
/// assert!(!tags.has("time"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    /// An empty tag set.
    pub fn new() -> Self {
        Tags(Vec::new())
    }

    /// The value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// True when `key` was present, even with an empty value.
    pub fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every tag.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (k, v) in iter {
            tags.set(k, v);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(value: &str) -> String {
        let mut escaped = String::new();
        escape_tag_value(&mut escaped, value).unwrap();
        escaped
    }

    #[test]
    fn test_unescape_each_sequence() {
        assert_eq!(unescape_tag_value("a\\:b"), "a;b");
        assert_eq!(unescape_tag_value("hello\\sworld"), "hello world");
        assert_eq!(unescape_tag_value("path\\\\file"), "path\\file");
        assert_eq!(unescape_tag_value("line\\rend"), "line\rend");
        assert_eq!(unescape_tag_value("line\\nend"), "line\nend");
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape_tag_value("test\\"), "test");
    }

    #[test]
    fn test_unescape_unknown_escape() {
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
        assert_eq!(unescape_tag_value("\\a\\b"), "ab");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a; b\\c\r\n"), "a\\:\\sb\\\\c\\r\\n");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_escape_roundtrip() {
        for original in [
            "simple",
            "with;semicolon",
            "\\\\\\",
            "\\s",
            "complex; \\ \n \r all",
        ] {
            assert_eq!(unescape_tag_value(&escape(original)), original);
        }
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut tags: Tags = [("a", "1"), ("b", "2")].into_iter().collect();
        tags.set("a", "3");
        let pairs: Vec<_> = tags.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_remove() {
        let mut tags: Tags = [("a", "1")].into_iter().collect();
        assert_eq!(tags.remove("a"), Some("1".to_string()));
        assert_eq!(tags.remove("a"), None);
        assert!(tags.is_empty());
    }
}
