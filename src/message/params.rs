//! Ordinal message parameters.

/// The parameters of a message, addressed from 1.
///
/// Meaning comes from position, so [`get`](Params::get) returns `""` both
/// for an omitted parameter and for one sent empty.
///
/// ```
/// use slirc_conn::Params;
///
/// let params = Params::from(vec!["#foo", "leaving now"]);
/// assert_eq!(params.get(1), "#foo");
/// assert_eq!(params.get(2), "leaving now");
/// assert_eq!(params.get(0), "");
/// assert_eq!(params.get(3), "");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params(Vec<String>);

impl Params {
    /// No parameters.
    pub fn new() -> Self {
        Params(Vec::new())
    }

    /// The `n`th parameter (1-based), or `""` when out of range.
    pub fn get(&self, n: usize) -> &str {
        match n.checked_sub(1).and_then(|i| self.0.get(i)) {
            Some(p) => p,
            None => "",
        }
    }

    /// Mutable access to the `n`th parameter (1-based).
    pub fn get_mut(&mut self, n: usize) -> Option<&mut String> {
        n.checked_sub(1).and_then(move |i| self.0.get_mut(i))
    }

    /// The last parameter, or `""` when there are none.
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Append a parameter.
    pub fn push(&mut self, param: impl Into<String>) {
        self.0.push(param.into());
    }

    /// Number of parameters actually present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every parameter.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate the parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The parameters as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> From<Vec<S>> for Params {
    fn from(v: Vec<S>) -> Self {
        Params(v.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Params {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Params(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Params {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
