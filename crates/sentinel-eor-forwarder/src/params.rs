//! Query parameters forwarded upstream.
//!
//! Absent and empty values are dropped at insertion time, so a
//! [`QueryParameters`] never serializes a `key=` pair.

use crate::operation::Operation;

/// Ordered mapping from parameter name to non-empty string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParameters {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, skipping absent or empty values.
    ///
    /// Setting a name twice replaces the earlier value in place.
    pub fn set<V>(&mut self, name: &'static str, value: Option<V>) -> &mut Self
    where
        V: Into<String>,
    {
        let Some(value) = value.map(Into::into) else {
            return self;
        };
        if value.is_empty() {
            return self;
        }

        if let Some(slot) = self.pairs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.pairs.push((name, value));
        }
        self
    }

    /// Builder form of [`QueryParameters::set`].
    #[must_use]
    pub fn with<V>(mut self, name: &'static str, value: Option<V>) -> Self
    where
        V: Into<String>,
    {
        self.set(name, value);
        self
    }

    /// Parameters for `get_events`.
    pub fn events(
        countryiso3s: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Self {
        Self::new()
            .with("countryiso3s", countryiso3s)
            .with("start_date", start_date)
            .with("end_date", end_date)
    }

    /// Parameters for `get_products`.
    pub fn products(url: Option<&str>) -> Self {
        Self::new().with("url", url)
    }

    /// Collect the parameters `operation` accepts from an arbitrary source.
    ///
    /// `lookup` is asked once per declared parameter name, in declaration
    /// order. Keys the operation does not declare are never requested.
    pub fn for_operation<'a, F>(operation: Operation, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        operation
            .parameters()
            .iter()
            .fold(Self::new(), |params, spec| {
                params.with(spec.name, lookup(spec.name))
            })
    }

    /// Value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(key, value)| (*key, value.as_str()))
    }
}
