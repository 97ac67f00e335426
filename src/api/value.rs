//! Document values and their Firestore REST JSON encoding.

use chrono::{DateTime, Utc};
use serde_json::{json, Map};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::path::DocPath;

pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(Fields),
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(Value::Timestamp).unwrap_or(Value::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Double(d) if d.is_finite() => Some(*d as i64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) | Value::Double(_) => 2,
            Value::Timestamp(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Map(_) => 6,
        }
    }

    /// Total order across value kinds, following Firestore's cross-type ordering
    /// (null < bool < number < timestamp < string < array < map).
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Double(b)) => (*a as f64).total_cmp(b),
            (Value::Double(a), Value::Integer(b)) => a.total_cmp(&(*b as f64)),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    let ord = left.total_cmp(right);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => a.len().cmp(&b.len()),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    pub fn to_rest(&self) -> serde_json::Value {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::Bool(b) => json!({ "booleanValue": b }),
            Value::Integer(n) => json!({ "integerValue": n.to_string() }),
            Value::Double(d) => json!({ "doubleValue": d }),
            Value::String(s) => json!({ "stringValue": s }),
            Value::Timestamp(ts) => json!({
                "timestampValue": ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
            }),
            Value::Array(values) => json!({
                "arrayValue": { "values": values.iter().map(Value::to_rest).collect::<Vec<_>>() }
            }),
            Value::Map(fields) => json!({ "mapValue": { "fields": fields_to_rest(fields) } }),
        }
    }

    pub fn from_rest(raw: &serde_json::Value) -> Value {
        let Some(obj) = raw.as_object() else {
            return Value::Null;
        };

        if let Some(b) = obj.get("booleanValue").and_then(|v| v.as_bool()) {
            return Value::Bool(b);
        }
        if let Some(n) = obj.get("integerValue") {
            // Integers travel as decimal strings; tolerate plain numbers too.
            let parsed = n
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .or_else(|| n.as_i64());
            return parsed.map(Value::Integer).unwrap_or(Value::Null);
        }
        if let Some(d) = obj.get("doubleValue").and_then(|v| v.as_f64()) {
            return Value::Double(d);
        }
        if let Some(s) = obj.get("stringValue").and_then(|v| v.as_str()) {
            return Value::String(s.to_string());
        }
        if let Some(ts) = obj.get("timestampValue").and_then(|v| v.as_str()) {
            return DateTime::parse_from_rfc3339(ts)
                .map(|parsed| Value::Timestamp(parsed.with_timezone(&Utc)))
                .unwrap_or(Value::Null);
        }
        if let Some(array) = obj.get("arrayValue") {
            let values = array
                .get("values")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().map(Value::from_rest).collect())
                .unwrap_or_default();
            return Value::Array(values);
        }
        if let Some(map) = obj.get("mapValue") {
            return Value::Map(fields_from_rest(map.get("fields")));
        }
        Value::Null
    }
}

pub fn fields_to_rest(fields: &Fields) -> serde_json::Value {
    let mut out = Map::new();
    for (key, value) in fields {
        out.insert(key.clone(), value.to_rest());
    }
    serde_json::Value::Object(out)
}

pub fn fields_from_rest(raw: Option<&serde_json::Value>) -> Fields {
    raw.and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(key, value)| (key.clone(), Value::from_rest(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// A document snapshot: its location plus the decoded fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocPath,
    pub fields: Fields,
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(path: DocPath, fields: Fields) -> Self {
        Self {
            path,
            fields,
            created_at: None,
        }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn int_field(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    pub fn timestamp_field(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }

    pub fn string_array_field(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Shorthand for building a field map inline.
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::api::value::Fields::new();
        $(map.insert($key.to_string(), $crate::api::value::Value::from($value));)*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_are_encoded_as_decimal_strings() {
        let encoded = Value::Integer(42).to_rest();
        assert_eq!(encoded, json!({ "integerValue": "42" }));
        assert_eq!(Value::from_rest(&encoded), Value::Integer(42));
    }

    #[test]
    fn decodes_nested_playlist_payload() {
        let raw = json!({
            "name": { "stringValue": "Road Trip" },
            "songs": { "integerValue": "3" },
            "contributors": { "arrayValue": { "values": [
                { "stringValue": "a@x.com" },
                { "stringValue": "b@x.com" }
            ] } },
            "lastPlayed": { "nullValue": null },
            "createdAt": { "timestampValue": "2024-05-01T10:00:00.123456Z" }
        });
        let fields = fields_from_rest(Some(&raw));
        let doc = Document::new(DocPath::parse("playlists/p1"), fields);

        assert_eq!(doc.str_field("name"), Some("Road Trip"));
        assert_eq!(doc.int_field("songs"), Some(3));
        assert_eq!(doc.string_array_field("contributors"), vec!["a@x.com", "b@x.com"]);
        assert!(doc.get("lastPlayed").is_some_and(Value::is_null));
        assert_eq!(
            doc.timestamp_field("createdAt").map(|ts| ts.timestamp()),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().timestamp())
        );
    }

    #[test]
    fn empty_array_value_decodes_to_empty_array() {
        let raw = json!({ "arrayValue": {} });
        assert_eq!(Value::from_rest(&raw), Value::Array(Vec::new()));
    }

    #[test]
    fn unknown_value_kind_decodes_to_null() {
        let raw = json!({ "geoPointValue": { "latitude": 1.0, "longitude": 2.0 } });
        assert_eq!(Value::from_rest(&raw), Value::Null);
    }

    #[test]
    fn ordering_puts_null_before_timestamps() {
        let ts = Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(Value::Null.total_cmp(&ts), Ordering::Less);
        assert_eq!(Value::Integer(2).total_cmp(&Value::Double(1.5)), Ordering::Greater);
    }
}
