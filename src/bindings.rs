//! Caller data and the per-call binding context
//!
//! [`Data`] is what a caller hands to the renderer. It is immutable and
//! reference counted so that every nested `include` renders against the very
//! same mapping as the outermost call.
//!
//! [`Bindings`] is the complete environment a template sees: a shallow copy
//! of the data plus the reserved `include` function. Nothing else from the
//! host leaks in.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::value::{Value, ValueKind};
use serde::Serialize;

use crate::error::DataError;

/// Reserved identifier bound to the include function
pub const INCLUDE: &str = "include";

/// Caller-supplied bindings shared by a render call and all of its includes.
#[derive(Debug, Clone, Default)]
pub struct Data(Arc<BTreeMap<String, Value>>);

impl Data {
    /// Empty data
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any serializable map-like value (struct, map, `serde_json::Value` object).
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, DataError> {
        Self::from_value(&Value::from_serialize(value))
    }

    /// Build from a map [`Value`], e.g. one produced by `minijinja::context!`.
    ///
    /// `undefined` and `none` count as empty data.
    pub fn from_value(value: &Value) -> Result<Self, DataError> {
        match value.kind() {
            ValueKind::Undefined | ValueKind::None => Ok(Self::new()),
            ValueKind::Map => {
                let mut entries = BTreeMap::new();
                let keys = value.try_iter().map_err(|_| DataError::NotAMap {
                    kind: value.kind().to_string(),
                })?;
                for key in keys {
                    let item = value.get_item(&key).unwrap_or_default();
                    entries.insert(key.to_string(), item);
                }
                Ok(Self(Arc::new(entries)))
            }
            other => Err(DataError::NotAMap {
                kind: other.to_string(),
            }),
        }
    }

    /// Copy with one extra binding; the original mapping is left untouched.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut entries = (*self.0).clone();
        entries.insert(key.into(), value.into());
        Self(Arc::new(entries))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether both handles point at the same mapping
    pub fn ptr_eq(&self, other: &Data) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(Arc::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}

/// The variable environment for one evaluation.
#[derive(Debug, Clone)]
pub struct Bindings {
    data: Data,
    include: Value,
}

impl Bindings {
    /// Shallow-merge `data` with the reserved `include` binding.
    ///
    /// A caller key named `include` is shadowed by the reserved one.
    pub fn build(data: &Data, include: Value) -> Self {
        Self {
            data: data.clone(),
            include,
        }
    }

    /// The caller data these bindings were built from
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Look up an identifier the way a template would see it
    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == INCLUDE {
            Some(&self.include)
        } else {
            self.data.get(name)
        }
    }

    /// Flatten into a single map value handed to the evaluator
    pub fn to_value(&self) -> Value {
        let mut map: BTreeMap<String, Value> = (*self.data.0).clone();
        map.insert(INCLUDE.to_string(), self.include.clone());
        Value::from(map)
    }
}
