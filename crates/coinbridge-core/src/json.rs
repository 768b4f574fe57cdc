//! JSON decoding that tolerates repeated object keys.
//!
//! Some daemons emit the same key twice in one object (`getrawtransaction`
//! repeats `time`, and the first occurrence is the real transaction time).
//! `serde_json::Value` keeps the *last* occurrence, so these responses are
//! decoded through [`FirstKeyWins`], which keeps the first occurrence at
//! every nesting depth and silently drops later duplicates.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::error::CoreError;

/// Decode `input`, keeping only the first occurrence of every object key.
///
/// Fails with [`CoreError::Parse`] (carrying line and column) on malformed
/// JSON or trailing data.
pub fn decode_first_key_wins(input: &str) -> Result<Value, CoreError> {
    let mut de = serde_json::Deserializer::from_str(input);
    let FirstKeyWins(value) = FirstKeyWins::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Re-serialize `input` with duplicate keys removed.
pub fn remove_duplicate_keys(input: &str) -> Result<String, CoreError> {
    let value = decode_first_key_wins(input)?;
    Ok(serde_json::to_string(&value)?)
}

/// A JSON value decoded with first-occurrence-wins key semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstKeyWins(pub Value);

impl<'de> Deserialize<'de> for FirstKeyWins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FirstKeyWinsVisitor).map(FirstKeyWins)
    }
}

struct FirstKeyWinsVisitor;

impl<'de> Visitor<'de> for FirstKeyWinsVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom(format!("non-finite number {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(FirstKeyWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            // The value must be consumed even when it is discarded.
            let FirstKeyWins(value) = map.next_value()?;
            if key == NUMBER_TOKEN {
                return number_from_text(value);
            }
            object.entry(key).or_insert(value);
        }
        Ok(Value::Object(object))
    }
}

/// With `arbitrary_precision`, `serde_json` hands every number to
/// `visit_map` as a single-entry map under this key, holding the literal.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

fn number_from_text<E: de::Error>(literal: Value) -> Result<Value, E> {
    match literal {
        Value::String(text) => serde_json::from_str::<Number>(&text)
            .map(Value::Number)
            .map_err(|e| E::custom(format!("invalid number `{text}`: {e}"))),
        other => Err(E::custom(format!("invalid number literal {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins_at_every_depth() {
        let value = decode_first_key_wins(r#"{"a":1,"a":2,"b":[{"x":1,"x":9}]}"#)
            .expect("valid JSON");
        assert_eq!(value, serde_json::json!({"a": 1, "b": [{"x": 1}]}));
    }

    #[test]
    fn duplicate_time_keeps_transaction_time() {
        let raw = r#"{"txid":"ab","time":1526881003,"vout":[],"time":1526881087}"#;
        let value = decode_first_key_wins(raw).expect("valid JSON");
        assert_eq!(value["time"], serde_json::json!(1526881003));
    }

    #[test]
    fn discarded_duplicate_may_be_a_nested_value() {
        let value =
            decode_first_key_wins(r#"{"k":"first","k":{"deep":[1,2,{"z":null}]},"n":null}"#)
                .expect("valid JSON");
        assert_eq!(value, serde_json::json!({"k": "first", "n": null}));
    }

    #[test]
    fn array_order_is_preserved() {
        let value = decode_first_key_wins(r#"[3,"two",1.5,true,null,[]]"#).expect("valid JSON");
        assert_eq!(value, serde_json::json!([3, "two", 1.5, true, null, []]));
    }

    #[test]
    fn scalars_decode_at_top_level() {
        assert_eq!(
            decode_first_key_wins("-42").expect("valid"),
            serde_json::json!(-42)
        );
        assert_eq!(
            decode_first_key_wins(r#""s""#).expect("valid"),
            serde_json::json!("s")
        );
    }

    #[test]
    fn numbers_keep_their_literal_text() {
        let value = decode_first_key_wins(
            r#"{"value":92233720368.54775807,"big":18446744073709551616,"value":1}"#,
        )
        .expect("valid JSON");
        assert_eq!(value["value"].to_string(), "92233720368.54775807");
        assert_eq!(value["big"].to_string(), "18446744073709551616");
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn malformed_json_reports_position() {
        let err = decode_first_key_wins("{\"a\":1,\n\"b\":}").expect_err("must fail");
        match err {
            CoreError::Parse(inner) => {
                assert_eq!(inner.line(), 2);
                assert!(inner.column() > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(matches!(
            decode_first_key_wins(r#"{"a":1} x"#),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn remove_duplicate_keys_reserializes() {
        let out = remove_duplicate_keys(r#"{"time":1,"time":2}"#).expect("valid JSON");
        assert_eq!(out, r#"{"time":1}"#);
    }
}
