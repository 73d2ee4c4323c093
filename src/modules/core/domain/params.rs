//! Bind parameters for statements

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Values bound to a statement's placeholders
///
/// Positional values bind to the dialect's native placeholders; named values
/// bind to `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameters {
    Positional(Vec<Value>),
    Named(BTreeMap<String, Value>),
}

impl Parameters {
    /// Build positional parameters
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Parameters::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Build named parameters
    pub fn named<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Parameters::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Parameters::Positional(values) => values.len(),
            Parameters::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable textual form: named keys in sorted order, compact JSON
    pub fn canonical(&self) -> String {
        match self {
            Parameters::Positional(values) => Value::Array(values.clone()).to_string(),
            Parameters::Named(values) => Value::Object(
                values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
            .to_string(),
        }
    }
}

impl From<Vec<Value>> for Parameters {
    fn from(values: Vec<Value>) -> Self {
        Parameters::Positional(values)
    }
}

impl From<BTreeMap<String, Value>> for Parameters {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Parameters::Named(values)
    }
}

impl From<HashMap<String, Value>> for Parameters {
    fn from(values: HashMap<String, Value>) -> Self {
        Parameters::Named(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_is_order_independent() {
        let a = Parameters::named([("name", json!("Marvin")), ("address", json!("Highway 42"))]);
        let b = Parameters::named([("address", json!("Highway 42")), ("name", json!("Marvin"))]);
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"{"address":"Highway 42","name":"Marvin"}"#);
    }

    #[test]
    fn test_canonical_distinguishes_values() {
        let a = Parameters::positional([1, 2]);
        let b = Parameters::positional([2, 1]);
        assert_ne!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "[1,2]");
    }

    #[test]
    fn test_untagged_serde() {
        let named: Parameters = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(named, Parameters::named([("id", 7)]));

        let positional: Parameters = serde_json::from_str(r#"[7, "x"]"#).unwrap();
        assert_eq!(positional.len(), 2);
        assert!(matches!(positional, Parameters::Positional(_)));
    }
}
