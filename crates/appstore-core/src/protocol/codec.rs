//! Binary property-list codec.
//!
//! Requests are flat string-to-string mappings. Responses are arbitrarily
//! nested and are decoded into [`PlistValue`] so that callers never cast
//! blindly: every typed access goes through an accessor that reports a
//! [`StoreError::MalformedResponse`] on mismatch.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Ordered string-to-string request body.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestPayload {
    entries: Vec<(String, String)>,
}

impl RequestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, replacing any existing value under the same key
    /// without changing its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Values may hold a password, so only keys are printed.
impl fmt::Debug for RequestPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.iter().map(|(k, _)| k)).finish()
    }
}

/// A decoded property-list value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Integer(i128),
    Real(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Data(Vec<u8>),
    Mapping(BTreeMap<String, PlistValue>),
    Sequence(Vec<PlistValue>),
}

impl PlistValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            PlistValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlistValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            PlistValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, PlistValue>> {
        match self {
            PlistValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PlistValue::String(_) => "string",
            PlistValue::Integer(_) => "integer",
            PlistValue::Real(_) => "real",
            PlistValue::Boolean(_) => "boolean",
            PlistValue::Date(_) => "date",
            PlistValue::Data(_) => "data",
            PlistValue::Mapping(_) => "mapping",
            PlistValue::Sequence(_) => "sequence",
        }
    }

    /// JSON rendering. Dates become RFC 3339 strings and data becomes hex.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            PlistValue::String(s) => Value::String(s.clone()),
            PlistValue::Integer(i) => {
                if let Ok(n) = i64::try_from(*i) {
                    Value::from(n)
                } else if let Ok(n) = u64::try_from(*i) {
                    Value::from(n)
                } else {
                    Value::String(i.to_string())
                }
            }
            PlistValue::Real(r) => serde_json::Number::from_f64(*r)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PlistValue::Boolean(b) => Value::Bool(*b),
            PlistValue::Date(d) => Value::String(d.to_rfc3339()),
            PlistValue::Data(bytes) => Value::String(hex::encode(bytes)),
            PlistValue::Mapping(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            PlistValue::Sequence(s) => Value::Array(s.iter().map(PlistValue::to_json).collect()),
        }
    }

    fn from_plist(value: plist::Value, length: usize) -> Result<Self, StoreError> {
        Ok(match value {
            plist::Value::String(s) => PlistValue::String(s),
            plist::Value::Integer(i) => {
                let n = i
                    .as_signed()
                    .map(i128::from)
                    .or_else(|| i.as_unsigned().map(i128::from))
                    .ok_or_else(|| StoreError::malformed("integer out of range", length))?;
                PlistValue::Integer(n)
            }
            plist::Value::Uid(uid) => PlistValue::Integer(i128::from(uid.get())),
            plist::Value::Real(r) => PlistValue::Real(r),
            plist::Value::Boolean(b) => PlistValue::Boolean(b),
            plist::Value::Date(d) => PlistValue::Date(DateTime::<Utc>::from(SystemTime::from(d))),
            plist::Value::Data(bytes) => PlistValue::Data(bytes),
            plist::Value::Dictionary(dict) => {
                let mut map = BTreeMap::new();
                for (k, v) in dict {
                    map.insert(k, PlistValue::from_plist(v, length)?);
                }
                PlistValue::Mapping(map)
            }
            plist::Value::Array(items) => PlistValue::Sequence(
                items
                    .into_iter()
                    .map(|v| PlistValue::from_plist(v, length))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                return Err(StoreError::malformed(
                    format!("unsupported plist value: {:?}", other),
                    length,
                ));
            }
        })
    }
}

/// Top-level mapping of a decoded response.
#[derive(Debug, Clone)]
pub struct ResponseMapping {
    entries: BTreeMap<String, PlistValue>,
    raw_len: usize,
}

impl PartialEq for ResponseMapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl ResponseMapping {
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.entries.get(key)
    }

    /// Walk nested mappings along `path`.
    pub fn lookup(&self, path: &[&str]) -> Option<&PlistValue> {
        let (first, rest) = path.split_first()?;
        let mut current = self.entries.get(*first)?;
        for key in rest {
            current = current.as_mapping()?.get(*key)?;
        }
        Some(current)
    }

    /// Like [`lookup`](Self::lookup) but reports a missing field as malformed.
    pub fn require(&self, path: &[&str]) -> Result<&PlistValue, StoreError> {
        self.lookup(path).ok_or_else(|| {
            StoreError::malformed(format!("missing field {}", path.join(".")), self.raw_len)
        })
    }

    pub fn require_str(&self, path: &[&str]) -> Result<&str, StoreError> {
        let value = self.require(path)?;
        value.as_str().ok_or_else(|| {
            StoreError::malformed(
                format!(
                    "field {} is a {}, expected string",
                    path.join("."),
                    value.type_name()
                ),
                self.raw_len,
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PlistValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the body this mapping was decoded from.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// Serialize a request payload as a binary plist dictionary.
pub fn encode(payload: &RequestPayload) -> Result<Vec<u8>, StoreError> {
    let mut dict = plist::Dictionary::new();
    for (key, value) in payload.iter() {
        dict.insert(key.to_string(), plist::Value::String(value.to_string()));
    }

    let mut buf = Vec::new();
    plist::Value::Dictionary(dict)
        .to_writer_binary(&mut buf)
        .map_err(|e| StoreError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Decode a plist body whose root is a dictionary.
pub fn decode(bytes: &[u8]) -> Result<ResponseMapping, StoreError> {
    let length = bytes.len();
    let value = plist::Value::from_reader(Cursor::new(bytes))
        .map_err(|e| StoreError::malformed(format!("invalid plist: {}", e), length))?;

    match PlistValue::from_plist(value, length)? {
        PlistValue::Mapping(entries) => Ok(ResponseMapping {
            entries,
            raw_len: length,
        }),
        other => Err(StoreError::malformed(
            format!("root is a {}, expected mapping", other.type_name()),
            length,
        )),
    }
}
