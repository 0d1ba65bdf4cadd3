//! Per-call encoder options
//!
//! Callers pass the same open option map to every adapter. Each adapter picks
//! out the keys it understands and ignores the rest.

use std::collections::HashMap;

/// A single option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Open key/value map of encoder hints
///
/// # Examples
///
/// ```
/// use lamco_codec::EncodeOptions;
///
/// let options = EncodeOptions::new().with("quality", 80).with("alpha", true);
/// assert_eq!(options.get_int("quality"), Some(80));
/// assert_eq!(options.get_bool("alpha"), Some(true));
/// assert_eq!(options.get_int("speed"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOptions {
    values: HashMap<String, OptionValue>,
}

impl EncodeOptions {
    /// Create an empty option map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, replacing any previous value for the key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an option in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Integer value, accepting whole floats
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            OptionValue::Int(v) => Some(*v),
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            OptionValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Boolean value
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Keys present in the map
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
