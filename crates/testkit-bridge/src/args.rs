//! Ordered argument lists for method invocations.
//!
//! Servers read arguments by name but may also depend on the order they
//! appear in the query string, so entries are kept in insertion order and
//! emitted verbatim.

use crate::value::{Handle, Value};
use std::collections::BTreeMap;

/// The named arguments of one method invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    entries: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Args::default()
    }

    /// Append an argument. Duplicate names are not collapsed; both entries
    /// are sent and the server decides what that means.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.entries.push((name.into(), value));
        self
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(name, Value::String(value.into()))
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.set(name, Value::Int(value))
    }

    pub fn set_double(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.set(name, Value::Double(value))
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.set(name, Value::Bool(value))
    }

    pub fn set_null(&mut self, name: impl Into<String>) -> &mut Self {
        self.set(name, Value::Null)
    }

    /// Append a remote handle argument.
    pub fn set_handle(&mut self, name: impl Into<String>, handle: &Handle) -> &mut Self {
        self.set(name, Value::Pointer(handle.clone()))
    }

    pub fn set_array(&mut self, name: impl Into<String>, items: Vec<Value>) -> &mut Self {
        self.set(name, Value::Array(items))
    }

    pub fn set_dict(
        &mut self,
        name: impl Into<String>,
        entries: BTreeMap<String, Value>,
    ) -> &mut Self {
        self.set(name, Value::Dict(entries))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
