//! Value model for parsed annotation arguments and constructed annotations
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Raw named arguments collected from one argument list
pub type ValueMap = BTreeMap<String, Value>;

/// An argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(ArrayValue),
    Object(Box<Annotation>),
}

impl Value {
    /// Runtime type name as used in type errors and `@var` declarations
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Annotation> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// JSON rendering used inside error messages
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.type_name().to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<ArrayValue> for Value {
    fn from(value: ArrayValue) -> Self {
        Value::Array(value)
    }
}

impl From<Annotation> for Value {
    fn from(value: Annotation) -> Self {
        Value::Object(Box::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(array) => array.serialize(serializer),
            Value::Object(object) => object.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Object(object) => write!(f, "@{}", object.class),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Array key; decimal strings in canonical form become integer keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    pub fn from_string(key: &str) -> ArrayKey {
        if is_canonical_integer(key) {
            if let Ok(i) = key.parse::<i64>() {
                return ArrayKey::Int(i);
            }
        }
        ArrayKey::Str(key.to_string())
    }

    /// Key for a scalar value; arrays and objects cannot be keys
    pub fn from_value(value: &Value) -> Option<ArrayKey> {
        match value {
            Value::Null => Some(ArrayKey::Str(String::new())),
            Value::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            Value::Integer(i) => Some(ArrayKey::Int(*i)),
            Value::Float(f) => Some(ArrayKey::Int(f.trunc() as i64)),
            Value::String(s) => Some(ArrayKey::from_string(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

fn is_canonical_integer(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return !key.starts_with('-');
    }
    !digits.starts_with('0')
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Insertion-ordered array with integer and string keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayValue {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl ArrayValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append under the next free integer index
    pub fn push(&mut self, value: Value) {
        let key = ArrayKey::Int(self.next_index);
        self.insert(key, value);
    }

    /// Set a key; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn contains_value(&self, value: &Value) -> bool {
        self.values().any(|candidate| candidate == value)
    }

    /// Keys are exactly 0..len in order
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (key, _))| *key == ArrayKey::Int(i as i64))
    }
}

impl FromIterator<Value> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = ArrayValue::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl<V: Into<Value>> FromIterator<(ArrayKey, V)> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, V)>>(iter: I) -> Self {
        let mut array = ArrayValue::new();
        for (key, value) in iter {
            array.insert(key, value.into());
        }
        array
    }
}

impl Serialize for ArrayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_list() {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for value in self.values() {
                seq.serialize_element(value)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.iter() {
                map.serialize_entry(&key.to_string(), value)?;
            }
            map.end()
        }
    }
}

/// A constructed annotation: its fully-qualified type plus property values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub class: String,
    pub properties: ValueMap,
}

impl Annotation {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            properties: ValueMap::new(),
        }
    }

    pub fn with_properties(class: impl Into<String>, properties: ValueMap) -> Self {
        Self {
            class: class.into(),
            properties,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    /// Case-insensitive type comparison; a leading `\` is ignored
    pub fn is(&self, class: &str) -> bool {
        self.class
            .eq_ignore_ascii_case(class.trim_start_matches('\\'))
    }

    /// Last segment of the type name
    pub fn short_name(&self) -> &str {
        self.class.rsplit('\\').next().unwrap_or(&self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_overwrite_keep_order() {
        let mut array = ArrayValue::new();
        array.push(Value::from("a"));
        array.insert(ArrayKey::from_string("name"), Value::from("x"));
        array.insert(ArrayKey::Int(0), Value::from("b"));
        array.push(Value::from("c"));

        let keys: Vec<_> = array.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["0", "name", "1"]);
        assert_eq!(array.get(&ArrayKey::Int(0)), Some(&Value::from("b")));
    }

    #[test]
    fn test_explicit_integer_key_moves_next_index() {
        let mut array = ArrayValue::new();
        array.insert(ArrayKey::Int(5), Value::Integer(1));
        array.push(Value::Integer(2));
        assert_eq!(array.get(&ArrayKey::Int(6)), Some(&Value::Integer(2)));
        assert!(!array.is_list());
    }

    #[test]
    fn test_canonical_string_keys() {
        assert_eq!(ArrayKey::from_string("12"), ArrayKey::Int(12));
        assert_eq!(ArrayKey::from_string("-3"), ArrayKey::Int(-3));
        assert_eq!(ArrayKey::from_string("012"), ArrayKey::Str("012".into()));
        assert_eq!(ArrayKey::from_string("-0"), ArrayKey::Str("-0".into()));
        assert_eq!(ArrayKey::from_string("1.5"), ArrayKey::Str("1.5".into()));
    }

    #[test]
    fn test_serialization_distinguishes_lists_and_maps() {
        let list = Value::from(vec![1i64, 2, 3]);
        assert_eq!(list.to_json(), "[1,2,3]");

        let map: ArrayValue = vec![(ArrayKey::from_string("a"), Value::Bool(true))]
            .into_iter()
            .collect();
        assert_eq!(Value::Array(map).to_json(), r#"{"a":true}"#);
    }

    #[test]
    fn test_type_names_and_annotation_helpers() {
        let route = Annotation::new("Acme\\Route").with("path", "/");
        assert_eq!(Value::from(route.clone()).type_name(), "object");
        assert_eq!(Value::Float(1.0).type_name(), "double");
        assert!(route.is("\\acme\\route"));
        assert_eq!(route.short_name(), "Route");
        assert_eq!(route.get("path"), Some(&Value::from("/")));
    }
}
