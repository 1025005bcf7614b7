//! String-keyed typed configuration for interpolation method construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::remap_error::MeshRemapError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<usize> for ConfigValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}
impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}
impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Key/value configuration with typed getters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    entries: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, MeshRemapError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ConfigValue::Bool(v)) => Ok(Some(*v)),
            Some(_) => Err(MeshRemapError::ConfigTypeMismatch {
                key: key.to_owned(),
                expected: "bool",
            }),
        }
    }

    /// Integer lookup; a float holding an integral value is accepted.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, MeshRemapError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ConfigValue::Int(v)) => Ok(Some(*v)),
            Some(ConfigValue::Float(v)) if v.fract() == 0.0 => Ok(Some(*v as i64)),
            Some(_) => Err(MeshRemapError::ConfigTypeMismatch {
                key: key.to_owned(),
                expected: "int",
            }),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>, MeshRemapError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ConfigValue::Float(v)) => Ok(Some(*v)),
            Some(ConfigValue::Int(v)) => Ok(Some(*v as f64)),
            Some(_) => Err(MeshRemapError::ConfigTypeMismatch {
                key: key.to_owned(),
                expected: "float",
            }),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, MeshRemapError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ConfigValue::Str(v)) => Ok(Some(v)),
            Some(_) => Err(MeshRemapError::ConfigTypeMismatch {
                key: key.to_owned(),
                expected: "string",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_typed_getters() {
        let cfg = Config::new()
            .with("k-nearest-neighbours", 4usize)
            .with("tolerance", 0.5)
            .with("method", "finite-element")
            .with("verbose", true);
        assert_eq!(cfg.get_int("k-nearest-neighbours").unwrap(), Some(4));
        assert_eq!(cfg.get_float("tolerance").unwrap(), Some(0.5));
        assert_eq!(cfg.get_str("method").unwrap(), Some("finite-element"));
        assert_eq!(cfg.get_bool("verbose").unwrap(), Some(true));
        assert_eq!(cfg.get_int("absent").unwrap(), None);
    }

    #[test]
    fn numeric_coercion() {
        let cfg = Config::new().with("k", 3.0).with("w", 2i64);
        assert_eq!(cfg.get_int("k").unwrap(), Some(3));
        assert_eq!(cfg.get_float("w").unwrap(), Some(2.0));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let cfg = Config::new().with("method", "knn");
        assert!(matches!(
            cfg.get_int("method").unwrap_err(),
            MeshRemapError::ConfigTypeMismatch { expected: "int", .. }
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = Config::new().with("k", 2i64).with("name", "nn");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_str("name").unwrap(), Some("nn"));
    }
}
