//! Read-side projection of the status record written by the captioning
//! pipeline.
//!
//! `GET /caption` hands back the raw DynamoDB item, so every field arrives in
//! attribute-value form (`{"S": "..."}` / `{"N": "..."}`). Older payloads and
//! hand-written fixtures use bare values and camelCase keys; both decode the
//! same way.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusRecord {
    #[serde(default, deserialize_with = "attribute_string")]
    pub caption: Option<String>,

    #[serde(
        default,
        alias = "rekognitionLabels",
        deserialize_with = "attribute_string"
    )]
    pub rekognition_labels: Option<String>,

    #[serde(default, deserialize_with = "attribute_string")]
    pub classification: Option<String>,

    #[serde(default, alias = "riskLevel", deserialize_with = "attribute_string")]
    pub risk_level: Option<String>,

    #[serde(default, deserialize_with = "attribute_string")]
    pub timestamp: Option<String>,

    #[serde(default, alias = "s3Location", deserialize_with = "attribute_string")]
    pub s3_location: Option<String>,
}

impl StatusRecord {
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Decode(format!("status record: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct LabelDocument {
    #[serde(rename = "Labels")]
    labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    #[serde(rename = "Name")]
    name: String,
}

/// Parses the Rekognition label dump. The pipeline stores it with Python-style
/// single quotes, so every `'` is turned into `"` before JSON parsing.
pub fn parse_labels(raw: &str) -> Result<Vec<String>> {
    let repaired = raw.replace('\'', "\"");
    let document: LabelDocument =
        serde_json::from_str(&repaired).map_err(|e| Error::MalformedLabels(e.to_string()))?;

    Ok(document.labels.into_iter().map(|label| label.name).collect())
}

fn attribute_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).map_err(serde::de::Error::custom)
}

fn scalar_text(value: &Value) -> std::result::Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Object(map) => {
            if map.get("NULL").is_some() {
                return Ok(None);
            }
            match map.get("S").or_else(|| map.get("N")) {
                Some(inner @ (Value::String(_) | Value::Number(_))) => scalar_text(inner),
                _ => Err(format!("unsupported attribute value: {}", value)),
            }
        }
        Value::Array(_) => Err(format!("unsupported attribute value: {}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_attribute_value_item() {
        let record = StatusRecord::from_json(json!({
            "caption": {"S": "A forklift is blocking the exit."},
            "rekognition_labels": {"S": "{'Labels': [{'Name': 'Forklift'}]}"},
            "classification": {"S": "1 "},
            "risk_level": {"N": "7"},
            "timestamp": {"N": "1735600000"},
            "s3_location": {"S": "s3://bucket/images/frame42.jpg"},
            "ID": {"S": "cam-01"}
        }))
        .unwrap();

        assert_eq!(record.caption.as_deref(), Some("A forklift is blocking the exit."));
        assert_eq!(record.classification.as_deref(), Some("1 "));
        assert_eq!(record.risk_level.as_deref(), Some("7"));
        assert_eq!(record.timestamp.as_deref(), Some("1735600000"));
        assert_eq!(
            record.s3_location.as_deref(),
            Some("s3://bucket/images/frame42.jpg")
        );
    }

    #[test]
    fn decodes_plain_camel_case_item() {
        let record = StatusRecord::from_json(json!({
            "classification": "0",
            "riskLevel": 3,
            "timestamp": 1735600000123u64,
            "s3Location": "bucket/path/frame.jpg",
            "rekognitionLabels": "{'Labels': []}"
        }))
        .unwrap();

        assert_eq!(record.risk_level.as_deref(), Some("3"));
        assert_eq!(record.timestamp.as_deref(), Some("1735600000123"));
        assert_eq!(record.rekognition_labels.as_deref(), Some("{'Labels': []}"));
        assert_eq!(record.caption, None);
    }

    #[test]
    fn missing_and_null_fields_are_absent() {
        let record = StatusRecord::from_json(json!({"caption": {"NULL": true}})).unwrap();
        assert_eq!(record, StatusRecord::default());
    }

    #[test]
    fn unsupported_shapes_are_decode_errors() {
        let err = StatusRecord::from_json(json!({"caption": {"L": []}})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = StatusRecord::from_json(json!("not an item")).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn single_quoted_labels_match_double_quoted() {
        let single = "{'Labels': [{'Name': 'Person', 'Confidence': 99.1}, {'Name': 'Helmet'}]}";
        let double = single.replace('\'', "\"");

        assert_eq!(parse_labels(single).unwrap(), vec!["Person", "Helmet"]);
        assert_eq!(parse_labels(single).unwrap(), parse_labels(&double).unwrap());
    }

    #[test]
    fn malformed_labels_are_reported() {
        for raw in [
            "",
            "{'Labels': [{'Name': 'Person'",
            "{'Items': []}",
            "{'Labels': [{'Confidence': 10}]}",
            "{'Labels': [{'Name': 'Car', 'Visible': True}]}",
        ] {
            let err = parse_labels(raw).unwrap_err();
            assert!(matches!(err, Error::MalformedLabels(_)), "{raw}: {err:?}");
        }
    }
}
