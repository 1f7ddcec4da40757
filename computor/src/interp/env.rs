//! Variable environment

use super::Value;
use crate::error::{EvalError, Result};
use std::collections::HashMap;

/// The identifier reserved for the imaginary unit
pub const IMAGINARY_UNIT: &str = "i";

/// Session bindings, keyed by lowercase name and listed in first-definition order
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    order: Vec<String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or overwrite a name. `i` is refused and leaves the environment untouched.
    pub fn define(&mut self, name: &str, value: Value) -> Result<()> {
        let key = name.to_ascii_lowercase();
        if key == IMAGINARY_UNIT {
            return Err(EvalError::ReservedName { span: None });
        }
        if !self.bindings.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.bindings.insert(key, value);
        Ok(())
    }

    /// Look up a name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bindings in first-definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.bindings.get(name).map(|value| (name.as_str(), value)))
    }

    /// Names currently bound to functions
    pub fn function_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter()
            .filter(|(_, value)| matches!(value, Value::Function(_)))
            .map(|(name, _)| name)
    }
}
