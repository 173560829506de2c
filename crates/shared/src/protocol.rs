use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Amount, ObligationRecord, Party};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub me: Party,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: Vec<Party>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionState {
    pub data: ObligationRecord,
}

/// Vault entry envelope. Sibling fields such as `ref` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEnvelope {
    pub state: TransactionState,
}

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("obligation collection must be a JSON object or array, got {0}")]
    UnexpectedShape(&'static str),
    #[error("entry `{key}` has no state.data payload: {source}")]
    MalformedEntry {
        key: String,
        source: serde_json::Error,
    },
}

/// Response of the `obligations` and `my-obligations` endpoints: either a
/// mapping of key to envelope or an array of envelopes. Object keys are
/// enumerated like `Object.keys`: array-index keys first in numeric order,
/// then the remaining keys in document order.
#[derive(Debug, Clone, Default)]
pub struct ObligationCollection {
    entries: Vec<(String, StateEnvelope)>,
}

impl ObligationCollection {
    pub fn from_value(value: Value) -> Result<Self, CollectionError> {
        let raw: Vec<(String, Value)> = match value {
            Value::Object(map) => enumeration_order(map.into_iter().collect()),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Value::Null => return Err(CollectionError::UnexpectedShape("null")),
            Value::Bool(_) => return Err(CollectionError::UnexpectedShape("a boolean")),
            Value::Number(_) => return Err(CollectionError::UnexpectedShape("a number")),
            Value::String(_) => return Err(CollectionError::UnexpectedShape("a string")),
        };

        let entries = raw
            .into_iter()
            .map(|(key, item)| match serde_json::from_value::<StateEnvelope>(item) {
                Ok(envelope) => Ok((key, envelope)),
                Err(source) => Err(CollectionError::MalformedEntry { key, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Records in reverse key order, so a ledger answering oldest-first is
    /// displayed newest-first.
    pub fn into_display_order(self) -> Vec<ObligationRecord> {
        self.entries
            .into_iter()
            .rev()
            .map(|(_, envelope)| envelope.state.data)
            .collect()
    }
}

fn array_index(key: &str) -> Option<u32> {
    let index = key.parse::<u32>().ok().filter(|index| *index < u32::MAX)?;
    (index.to_string() == key).then_some(index)
}

fn enumeration_order(entries: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let (mut indexed, named): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(key, _)| array_index(key).is_some());
    indexed.sort_by_key(|(key, _)| array_index(key));
    indexed.extend(named);
    indexed
}

impl<'de> Deserialize<'de> for ObligationCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateObligationForm {
    pub amount: String,
}

impl CreateObligationForm {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount: amount.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdRequest {
    pub external_id: String,
}

/// Server reply wrapped for display. `status` is absent when no HTTP
/// response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub status: Option<u16>,
    pub data: String,
}

impl MessagePayload {
    pub fn from_response(status: u16, body: &str) -> Self {
        // JSON string bodies are shown unquoted, anything else verbatim.
        let data = match serde_json::from_str::<Value>(body) {
            Ok(Value::String(text)) => text,
            _ => body.to_string(),
        };
        Self {
            status: Some(status),
            data,
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status: None,
            data: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data_of(records: Vec<ObligationRecord>) -> Vec<Value> {
        records.into_iter().map(|record| record.0).collect()
    }

    #[test]
    fn keyed_collection_displays_in_reverse_key_order() {
        let collection: ObligationCollection = serde_json::from_value(json!({
            "0": {"state": {"data": "A"}},
            "1": {"state": {"data": "B"}},
        }))
        .expect("collection");

        assert_eq!(data_of(collection.into_display_order()), vec![json!("B"), json!("A")]);
    }

    #[test]
    fn keyed_collection_keeps_document_order_of_keys() {
        let body = r#"{"b":{"state":{"data":1}},"a":{"state":{"data":2}},"c":{"state":{"data":3}}}"#;
        let collection: ObligationCollection = serde_json::from_str(body).expect("collection");

        assert_eq!(collection.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(
            data_of(collection.into_display_order()),
            vec![json!(3), json!(2), json!(1)]
        );
    }

    #[test]
    fn index_keys_enumerate_numerically_before_named_keys() {
        let body = r#"{"10":{"state":{"data":"ten"}},"9":{"state":{"data":"nine"}},"b":{"state":{"data":"bee"}}}"#;
        let collection: ObligationCollection = serde_json::from_str(body).expect("collection");

        assert_eq!(collection.keys().collect::<Vec<_>>(), vec!["9", "10", "b"]);
        assert_eq!(
            data_of(collection.into_display_order()),
            vec![json!("bee"), json!("ten"), json!("nine")]
        );
    }

    #[test]
    fn non_canonical_numbers_stay_in_document_order() {
        let collection = ObligationCollection::from_value(json!({
            "z": {"state": {"data": 1}},
            "07": {"state": {"data": 2}},
            "4294967295": {"state": {"data": 3}},
            "-1": {"state": {"data": 4}},
            "3": {"state": {"data": 5}},
        }))
        .expect("collection");

        assert_eq!(
            collection.keys().collect::<Vec<_>>(),
            vec!["3", "z", "07", "4294967295", "-1"]
        );
    }

    #[test]
    fn array_collection_ignores_sibling_fields() {
        let collection = ObligationCollection::from_value(json!([
            {"state": {"data": {"externalId": "x1"}, "notary": "N"}, "ref": {"index": 0}},
            {"state": {"data": {"externalId": "x2"}}, "ref": {"index": 1}},
        ]))
        .expect("collection");

        let records = collection.into_display_order();
        assert_eq!(records[0].external_id(), Some("x2"));
        assert_eq!(records[1].external_id(), Some("x1"));
    }

    #[test]
    fn rejects_entries_without_state_payload() {
        let err = ObligationCollection::from_value(json!({"k": {"data": "A"}}))
            .expect_err("must fail");
        assert!(matches!(err, CollectionError::MalformedEntry { ref key, .. } if key == "k"));

        let err = ObligationCollection::from_value(json!("nope")).expect_err("must fail");
        assert!(matches!(err, CollectionError::UnexpectedShape("a string")));
    }

    #[test]
    fn empty_collection_is_valid() {
        let collection = ObligationCollection::from_value(json!({})).expect("collection");
        assert!(collection.is_empty());
        assert!(collection.into_display_order().is_empty());
    }

    #[test]
    fn message_payload_unquotes_json_strings() {
        let payload = MessagePayload::from_response(200, r#""tx-42""#);
        assert_eq!(payload.data, "tx-42");
        assert!(payload.is_success());

        let payload = MessagePayload::from_response(500, r#"{"message":"boom"}"#);
        assert_eq!(payload.data, r#"{"message":"boom"}"#);
        assert!(!payload.is_success());

        let payload = MessagePayload::transport_failure("connection refused");
        assert_eq!(payload.status, None);
        assert!(!payload.is_success());
    }
}
