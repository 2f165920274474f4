//! # Wire Format Helpers
//!
//! The gateway speaks flat key-value maps. Outbound records are serde structs
//! whose unset fields are skipped; these helpers project them into ordered
//! JSON maps and decode inbound form-encoded bodies.

use crate::error::{CheckoutError, CheckoutResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Flat JSON object, keys in field-declaration order
pub type WireMap = Map<String, Value>;

/// Project a record into its wire map.
///
/// Only struct-shaped records are accepted; anything else is a bug in the caller.
pub fn to_wire_map<T: Serialize>(record: &T) -> CheckoutResult<WireMap> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(CheckoutError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Decode `application/x-www-form-urlencoded` data into a flat map.
///
/// Blank values are dropped and the last occurrence of a repeated key wins.
pub fn decode_form(encoded: &str) -> HashMap<String, String> {
    let mut map = decode_form_all(encoded);
    map.retain(|_, v| !v.is_empty());
    map
}

/// Like [`decode_form`], but a key sent with an empty value is kept
pub fn decode_form_all(encoded: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(encoded.trim_start_matches('?').as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Look up a required key, failing with a missing-field validation error
pub(crate) fn require<'a>(payload: &'a HashMap<String, String>, key: &str) -> CheckoutResult<&'a str> {
    payload
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| CheckoutError::missing_field(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        first_key: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        second_key: Option<u32>,
        third_key: bool,
    }

    #[test]
    fn test_to_wire_map_skips_unset_and_keeps_order() {
        let map = to_wire_map(&Sample {
            first_key: "a",
            second_key: None,
            third_key: true,
        })
        .unwrap();

        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["firstKey", "thirdKey"]);
    }

    #[test]
    fn test_to_wire_map_rejects_non_objects() {
        let err = to_wire_map(&42).unwrap_err();
        assert!(matches!(err, CheckoutError::Serialization(_)));
    }

    #[test]
    fn test_decode_form() {
        let map = decode_form("result=SUCCESS&Status=Paid&Empty=&MerchantOrderId=order%20001");

        assert_eq!(map.get("result").map(String::as_str), Some("SUCCESS"));
        assert_eq!(map.get("Status").map(String::as_str), Some("Paid"));
        assert_eq!(map.get("MerchantOrderId").map(String::as_str), Some("order 001"));
        assert!(!map.contains_key("Empty"));
    }

    #[test]
    fn test_decode_form_all_keeps_blank_values() {
        let map = decode_form_all("BuyerId=&Status=Paid");

        assert_eq!(map.get("BuyerId").map(String::as_str), Some(""));
        assert_eq!(map.get("Status").map(String::as_str), Some("Paid"));
    }

    #[test]
    fn test_decode_form_strips_leading_question_mark() {
        let map = decode_form("?TransactionId=tx-1");
        assert_eq!(map.get("TransactionId").map(String::as_str), Some("tx-1"));
    }
}
