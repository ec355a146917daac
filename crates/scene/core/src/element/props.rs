//! Property values for drawing element payloads.
//!
//! Elements carry an open-ended payload (geometry, style, tool-specific data)
//! that the change algebra treats as a flat mapping of string keys to values.
//! [`PropValue`] is the value universe for that mapping.

use std::collections::BTreeMap;

/// Flat payload mapping carried by every drawing element.
pub type Props = BTreeMap<String, PropValue>;

/// Bookkeeping keys that must never appear in a delta.
///
/// These counters churn on every mutation without carrying semantic meaning;
/// a transition touching only them must not produce a history entry.
pub const IRRELEVANT_PROPS: [&str; 4] = ["updated", "version", "versionNonce", "seed"];

/// Removes bookkeeping keys from a payload mapping.
///
/// The element struct keeps its own typed counters, but hosts sometimes
/// mirror them into the payload as well. Deltas strip them either way.
pub fn clear_irrelevant_props(props: &mut Props) {
    for key in IRRELEVANT_PROPS {
        props.remove(key);
    }
}

/// A single payload value.
///
/// Equality is structural. `Null` doubles as the "key absent" marker inside
/// partials: a delta half recording `Null` for a key means the key did not
/// exist on that side of the transition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<PropValue>),
    Map(BTreeMap<String, PropValue>),
}

impl PropValue {
    /// Returns true for the `Null` absent-key marker.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_irrelevant_props_strips_only_bookkeeping_keys() {
        let mut props = Props::new();
        props.insert("x".into(), PropValue::Int(10));
        props.insert("updated".into(), PropValue::Int(123));
        props.insert("versionNonce".into(), PropValue::Int(7));
        props.insert("version".into(), PropValue::Int(3));
        props.insert("seed".into(), PropValue::Int(99));

        clear_irrelevant_props(&mut props);

        assert_eq!(props.len(), 1);
        assert_eq!(props.get("x"), Some(&PropValue::Int(10)));
    }

    #[test]
    fn prop_value_equality_is_structural() {
        let mut a = BTreeMap::new();
        a.insert("inner".to_owned(), PropValue::Bool(true));
        let mut b = BTreeMap::new();
        b.insert("inner".to_owned(), PropValue::Bool(true));

        assert_eq!(PropValue::Map(a), PropValue::Map(b));
        assert_ne!(PropValue::Int(1), PropValue::Float(1.0));
    }
}
