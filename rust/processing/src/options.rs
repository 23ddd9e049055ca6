// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape options and their cache keys
//!
//! Options are an open JSON object: builders read the keys they recognise
//! and ignore the rest (colours, intensities and other styling values are
//! carried through untouched).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Cache key of empty or absent options
pub const DEFAULT_OPTIONS_KEY: &str = "default";

/// Loosely typed option record for one shape build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeOptions {
    #[serde(flatten)]
    values: Map<String, Value>,
    /// Keys whose values cannot be encoded, e.g. non-finite numbers
    #[serde(skip)]
    unserializable: Vec<String>,
}

impl ShapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.unserializable.retain(|k| k != key);
        self.values.insert(key.to_string(), value.into());
    }

    /// Insert a float, recording the key as unserializable when it is not finite
    pub fn set_f64(&mut self, key: &str, value: f64) {
        match serde_json::Number::from_f64(value) {
            Some(n) => self.set(key, Value::Number(n)),
            None => {
                self.values.remove(key);
                if !self.unserializable.iter().any(|k| k == key) {
                    self.unserializable.push(key.to_string());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.unserializable.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.unserializable.len()
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn usize_or(&self, key: &str, default: usize) -> usize {
        self.get(key)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(default)
    }

    pub fn u32_or(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Numeric array option; non-numeric entries stay in place as `None`
    pub fn f64_list(&self, key: &str) -> Option<Vec<Option<f64>>> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Value::as_f64).collect())
    }

    /// Stable, order-independent key for these options.
    ///
    /// Returns `None` when some value cannot be encoded; callers then skip
    /// the cache and rebuild.
    pub fn cache_key(&self) -> Option<String> {
        if !self.unserializable.is_empty() {
            return None;
        }
        if self.values.is_empty() {
            return Some(DEFAULT_OPTIONS_KEY.to_string());
        }
        let mut canonical = String::new();
        write_canonical(&Value::Object(self.values.clone()), &mut canonical);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Some(hex::encode(hasher.finalize()))
    }
}

/// Cache key for optional options, `None` and `{}` sharing the default key
pub fn options_key(options: Option<&ShapeOptions>) -> Option<String> {
    match options {
        Some(options) => options.cache_key(),
        None => Some(DEFAULT_OPTIONS_KEY.to_string()),
    }
}

/// Numbers keyed by value: `2` and `2.0` encode alike, integral values
/// without a fraction
fn write_number(n: &serde_json::Number, out: &mut String) {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => out.push_str(&format!("{}", f as i64)),
        Some(f) => out.push_str(&format!("{}", f)),
        None => out.push_str(&n.to_string()),
    }
}

/// JSON encoding with object keys sorted at every level
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(n) => write_number(n, out),
        other => out.push_str(&other.to_string()),
    }
}
