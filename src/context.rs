use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CircleCiError, Result};

/// Key-value store shared by the actions of one run.
///
/// Actions mirror their results here under well-known keys
/// (`CIRCLECI_PIPELINE_ID`, `CIRCLECI_WAIT_RESULT`, ...) so later steps can
/// pick them up. Keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunContext {
    values: IndexMap<String, Value>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Read a context previously written by [`RunContext::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(CircleCiError::Encode)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
