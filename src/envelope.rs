use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Flat(Vec<Value>),
    Embedded(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    #[error("response is neither a content list nor an embedded collection")]
    Unrecognized,
    #[error("embedded collection has no '{0}' list")]
    MissingRel(String),
}

impl Envelope {
    pub fn detect(body: Value, rel: &str) -> Result<Self, EnvelopeError> {
        let Value::Object(mut object) = body else {
            return Err(EnvelopeError::Unrecognized);
        };

        if let Some(Value::Array(records)) = object.remove("content") {
            return Ok(Self::Flat(records));
        }

        match object.remove("_embedded") {
            Some(Value::Object(embedded)) => embedded_records(embedded, rel).map(Self::Embedded),
            _ => Err(EnvelopeError::Unrecognized),
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Flat(records) | Self::Embedded(records) => records,
        }
    }
}

fn embedded_records(mut embedded: Map<String, Value>, rel: &str) -> Result<Vec<Value>, EnvelopeError> {
    if let Some(Value::Array(records)) = embedded.remove(rel) {
        return Ok(records);
    }

    // Some projections name the list after the projection rather than the
    // collection; accept it when it is the only list present.
    let mut lists = embedded.into_iter().filter_map(|(_, value)| match value {
        Value::Array(records) => Some(records),
        _ => None,
    });
    match (lists.next(), lists.next()) {
        (Some(records), None) => Ok(records),
        _ => Err(EnvelopeError::MissingRel(rel.to_string())),
    }
}

/// Records that cannot be decoded are skipped; the rest keep their order.
pub fn decode_collection<T: DeserializeOwned>(body: Value, rel: &str) -> Result<Vec<T>, EnvelopeError> {
    Ok(Envelope::detect(body, rel)?
        .into_records()
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(rel, index, "skipping undecodable record: {err}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, CustomerSource, Training};
    use serde_json::json;

    fn customers() -> Value {
        json!([
            { "firstname": "Aino", "lastname": "Aalto", "_links": { "self": { "href": "https://api.example/api/customers/1" } } },
            { "firstname": "Eero", "lastname": "Eskola", "_links": { "self": { "href": "https://api.example/api/customers/2" } } }
        ])
    }

    #[test]
    fn both_envelopes_normalize_to_the_same_records() {
        let flat = json!({ "content": customers() });
        let embedded = json!({
            "_embedded": { "customers": customers() },
            "_links": { "self": { "href": "https://api.example/api/customers" } }
        });

        let from_flat: Vec<Customer> = decode_collection(flat, "customers").unwrap();
        let from_embedded: Vec<Customer> = decode_collection(embedded, "customers").unwrap();
        assert_eq!(from_flat, from_embedded);
        assert_eq!(from_flat.len(), 2);
        assert_eq!(from_flat[1].firstname, "Eero");
        assert_eq!(from_flat[1].id().as_deref(), Some("2"));
    }

    #[test]
    fn detects_shape_tags() {
        assert!(matches!(
            Envelope::detect(json!({ "content": [] }), "trainings"),
            Ok(Envelope::Flat(records)) if records.is_empty()
        ));
        assert!(matches!(
            Envelope::detect(json!({ "_embedded": { "trainings": [{}] } }), "trainings"),
            Ok(Envelope::Embedded(records)) if records.len() == 1
        ));
    }

    #[test]
    fn single_list_under_other_rel_is_accepted() {
        let body = json!({ "_embedded": { "trainingDtoes": [{ "activity": "Gym" }] } });
        let records: Vec<Training> = decode_collection(body, "trainings").unwrap();
        assert_eq!(records[0].activity, "Gym");
    }

    #[test]
    fn unknown_shapes_fail_explicitly() {
        assert_eq!(
            Envelope::detect(json!([{ "activity": "Gym" }]), "trainings"),
            Err(EnvelopeError::Unrecognized)
        );
        assert_eq!(
            Envelope::detect(json!({ "items": [] }), "trainings"),
            Err(EnvelopeError::Unrecognized)
        );
        assert_eq!(
            Envelope::detect(json!({ "_embedded": { "a": [], "b": [] } }), "trainings"),
            Err(EnvelopeError::MissingRel("trainings".into()))
        );
    }

    #[test]
    fn odd_customer_references_do_not_sink_the_list() {
        let body = json!({ "content": [
            { "activity": "Run", "duration": 30, "customer": { "firstname": "A", "lastname": "B" } },
            { "activity": "Gym", "duration": 20, "customer": 17 },
            { "activity": "Swim", "duration": 10, "_links": { "customer": [{ "href": "https://api.example/api/trainings/3/customer" }] } },
            { "activity": "Yoga", "links": "none", "_links": { "self": "broken" } },
            "not a record",
            { "activity": "Box", "customer": "https://api.example/api/customers/5" }
        ] });

        let records: Vec<Training> = decode_collection(body, "trainings").unwrap();
        let activities: Vec<_> = records.iter().map(|record| record.activity.as_str()).collect();
        assert_eq!(activities, ["Run", "Gym", "Swim", "Yoga", "Box"]);
        assert_eq!(records[1].customer_source(), CustomerSource::Missing);
        assert_eq!(
            records[2].customer_source(),
            CustomerSource::Link("https://api.example/api/trainings/3/customer")
        );
        assert_eq!(records[3].customer_source(), CustomerSource::Missing);
        assert_eq!(
            records[4].customer_source(),
            CustomerSource::Link("https://api.example/api/customers/5")
        );
    }
}
