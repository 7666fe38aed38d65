use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{json, Map, Value};

pub type Item = HashMap<String, AttributeValue>;

const TIMESTAMP_ATTRIBUTE: &str = "timestamp";

/// Renders an item in DynamoDB's attribute-value JSON, e.g.
/// `{"caption": {"S": "..."}}`, which is what the dashboard consumes.
pub fn item_to_json(item: &Item) -> Value {
    let map: Map<String, Value> = item
        .iter()
        .map(|(key, value)| (key.clone(), attribute_to_json(value)))
        .collect();

    Value::Object(map)
}

pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(val) => json!({ "S": val }),
        AttributeValue::N(val) => json!({ "N": val }),
        AttributeValue::Bool(val) => json!({ "BOOL": val }),
        AttributeValue::Ss(val) => json!({ "SS": val }),
        AttributeValue::Ns(val) => json!({ "NS": val }),
        AttributeValue::L(val) => {
            json!({ "L": val.iter().map(attribute_to_json).collect::<Vec<_>>() })
        }
        AttributeValue::M(val) => json!({ "M": item_to_json(val) }),
        // binary attributes are never written by the captioning pipeline
        _ => json!({ "NULL": true }),
    }
}

pub fn string_attribute<'a>(item: &'a Item, key: &str) -> Option<&'a str> {
    match item.get(key) {
        Some(AttributeValue::S(val)) => Some(val.as_str()),
        _ => None,
    }
}

/// Numbers are stored either as `N` or as numeric strings, depending on the
/// pipeline revision that wrote the item.
pub fn numeric_attribute(item: &Item, key: &str) -> Option<f64> {
    let raw = match item.get(key) {
        Some(AttributeValue::N(val)) | Some(AttributeValue::S(val)) => val,
        _ => return None,
    };

    raw.trim().parse::<f64>().ok().filter(|val| val.is_finite())
}

/// Whether `candidate` carries a later `timestamp` than `current`. An item
/// without a usable timestamp is never newer; one with a timestamp always
/// beats one without. Equal timestamps are not newer.
pub fn newer(candidate: &Item, current: &Item) -> bool {
    match (
        numeric_attribute(candidate, TIMESTAMP_ATTRIBUTE),
        numeric_attribute(current, TIMESTAMP_ATTRIBUTE),
    ) {
        (Some(candidate), Some(current)) => candidate > current,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// One fold step over scanned items: keeps whichever of `latest` and `item`
/// is newer, the earlier one on ties.
pub fn keep_latest(latest: Option<Item>, item: Item) -> Option<Item> {
    match latest {
        Some(current) if !newer(&item, &current) => Some(current),
        _ => Some(item),
    }
}
