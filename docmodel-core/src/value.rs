//! The value tree documents are built from.
//!
//! [`Value`] is a closed sum type: every conversion in this crate (from JSON
//! input, from stored BSON, into BSON, back to JSON) matches on it
//! exhaustively. Conversions into [`Value`] are total; input shapes that have
//! no counterpart degrade to [`Value::Null`] instead of failing. Rejecting
//! input is the job of [`validate`](crate::validate).

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};
use std::{collections::BTreeMap, fmt};

/// A JSON-compatible value with integers and doubles kept apart.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

/// The kind of a [`Value`], used by schemas to declare expected property types.
///
/// Kinds are compared by identity: an `Int64` value never satisfies a
/// `Double` property and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Int64,
    Double,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int64 => "int64",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        })
    }
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int64(_) => ValueKind::Int64,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a member of an object value. Returns `None` for other kinds.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Converts this value into the store's native representation.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(value) => Bson::Boolean(*value),
            Value::Int64(value) => Bson::Int64(*value),
            Value::Double(value) => Bson::Double(*value),
            Value::String(value) => Bson::String(value.clone()),
            Value::Array(items) => Bson::Array(items.iter().map(Value::to_bson).collect()),
            Value::Object(map) => Bson::Document(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_bson()))
                    .collect::<Document>(),
            ),
        }
    }

    /// Converts this value back into a JSON value.
    ///
    /// Non-finite doubles have no JSON representation and become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(value) => Json::Bool(*value),
            Value::Int64(value) => Json::Number((*value).into()),
            Value::Double(value) => Number::from_f64(*value).map_or(Json::Null, Json::Number),
            Value::String(value) => Json::String(value.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

/// Converts external JSON input.
///
/// Numbers representable as `i64` without a fractional or exponent part
/// become [`Value::Int64`]; every other number becomes [`Value::Double`].
impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(value) => Value::Bool(*value),
            Json::Number(number) => match number.as_i64() {
                Some(value) => Value::Int64(value),
                None => number.as_f64().map_or(Value::Null, Value::Double),
            },
            Json::String(value) => Value::String(value.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from(&json)
    }
}

/// Converts a stored BSON value.
///
/// 32-bit integers widen to [`Value::Int64`], object ids become their hex
/// string and datetimes their RFC 3339 string. Other BSON types have no
/// counterpart and become [`Value::Null`].
impl From<&Bson> for Value {
    fn from(bson: &Bson) -> Self {
        match bson {
            Bson::Null => Value::Null,
            Bson::Boolean(value) => Value::Bool(*value),
            Bson::Int32(value) => Value::Int64(i64::from(*value)),
            Bson::Int64(value) => Value::Int64(*value),
            Bson::Double(value) => Value::Double(*value),
            Bson::String(value) => Value::String(value.clone()),
            Bson::ObjectId(oid) => Value::String(oid.to_hex()),
            Bson::DateTime(value) => Value::String(value.to_chrono().to_rfc3339()),
            Bson::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Bson::Document(doc) => Value::from(doc),
            _ => Value::Null,
        }
    }
}

impl From<&Document> for Value {
    fn from(doc: &Document) -> Self {
        Value::Object(
            doc.iter()
                .map(|(key, value)| (key.clone(), Value::from(value)))
                .collect(),
        )
    }
}

impl From<&Value> for Json {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        value.to_bson()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
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

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_their_kind() {
        assert_eq!(Value::from(json!(5)), Value::Int64(5));
        assert_eq!(Value::from(json!(-5)), Value::Int64(-5));
        assert_eq!(Value::from(json!(5.0)), Value::Double(5.0));
        assert_eq!(Value::from(json!(2.5)), Value::Double(2.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Double(u64::MAX as f64));

        let parsed: Json = serde_json::from_str("1e3").unwrap();
        assert_eq!(Value::from(parsed).kind(), ValueKind::Double);
    }

    #[test]
    fn nested_input_converts_recursively() {
        let value = Value::from(json!({
            "name": "en",
            "tags": [1, "two", null, true],
            "meta": { "ratio": 0.5 }
        }));

        assert_eq!(value.get("name"), Some(&Value::from("en")));
        assert_eq!(
            value.get("tags"),
            Some(&Value::Array(vec![
                Value::Int64(1),
                Value::from("two"),
                Value::Null,
                Value::Bool(true),
            ]))
        );
        assert_eq!(
            value.get("meta").and_then(|meta| meta.get("ratio")),
            Some(&Value::Double(0.5))
        );
    }

    #[test]
    fn bson_conversion_is_kind_preserving() {
        let value = Value::from(json!({ "count": 3, "ratio": 1.0, "list": [1] }));

        assert_eq!(
            value.to_bson(),
            Bson::Document(doc! { "count": 3_i64, "list": [1_i64], "ratio": 1.0 })
        );
        assert_eq!(Value::from(&value.to_bson()), value);
    }

    #[test]
    fn stored_bson_degrades_gracefully() {
        let oid = ObjectId::new();
        let stored = doc! {
            "small": 7_i32,
            "id": oid,
            "bound": Bson::MaxKey,
        };

        let value = Value::from(&stored);
        assert_eq!(value.get("small"), Some(&Value::Int64(7)));
        assert_eq!(value.get("id"), Some(&Value::String(oid.to_hex())));
        assert_eq!(value.get("bound"), Some(&Value::Null));
    }

    #[test]
    fn stored_dates_become_rfc3339_strings() {
        let stored = doc! { "opened": bson::DateTime::from_millis(1_700_000_000_000) };

        assert_eq!(
            Value::from(&stored).get("opened"),
            Some(&Value::String("2023-11-14T22:13:20+00:00".into()))
        );
    }

    #[test]
    fn non_finite_doubles_serialize_as_null() {
        assert_eq!(Value::Double(f64::NAN).to_json(), Json::Null);
    }

    fn arb_json() -> impl Strategy<Value = Json> {
        let leaf = prop_oneof![
            Just(Json::Null),
            any::<bool>().prop_map(Json::Bool),
            any::<i64>().prop_map(|n| Json::Number(n.into())),
            any::<f64>()
                .prop_filter_map("finite", Number::from_f64)
                .prop_map(Json::Number),
            "[a-z0-9 ]{0,8}".prop_map(Json::String),
        ];

        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|map| Json::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn json_round_trips_through_value(json in arb_json()) {
            prop_assert_eq!(Value::from(&json).to_json(), json);
        }
    }
}
