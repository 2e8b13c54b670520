// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::Reading;
use crate::{FeedError, ReadingSource};

/// Envelope returned by `GET /get/latest/dweet/for/{thing}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DweetResponse {
    pub this: String,
    /// Entry list on success, a status code or message otherwise.
    #[serde(default)]
    pub with: serde_json::Value,
    /// Reason given when `this` is not `succeeded`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub because: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DweetEntry {
    pub thing: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub content: serde_json::Map<String, serde_json::Value>,
}

impl DweetResponse {
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Picks the newest entry as the reading for `source`.
    pub fn into_reading(self, source: ReadingSource) -> Result<Reading, FeedError> {
        if self.this != "succeeded" {
            return Err(FeedError::Unsuccessful(self.because.unwrap_or(self.this)));
        }

        let entries: Vec<DweetEntry> = match self.with {
            serde_json::Value::Null => Vec::new(),
            with => serde_json::from_value(with)?,
        };

        let entry = entries
            .into_iter()
            .max_by_key(|entry| entry.created)
            .ok_or_else(|| FeedError::Empty(source.to_string()))?;

        log::trace!("{source} dweet from {} created {}", entry.thing, entry.created);

        Ok(Reading {
            source,
            thing: entry.thing,
            created: entry.created,
            content: entry.content,
        })
    }
}

#[test]
fn test_dweet_newest_entry_wins() {
    let response = DweetResponse::from_json_str(
        r#"{
            "this": "succeeded",
            "by": "getting",
            "the": "dweets",
            "with": [
                { "thing": "backyard-wx", "created": "2024-06-01T11:40:00.125Z", "content": { "tempf": 71.2 } },
                { "thing": "backyard-wx", "created": "2024-06-01T12:00:00.000Z", "content": { "tempf": 72.5 } }
            ]
        }"#,
    )
    .unwrap();

    let reading = response.into_reading(ReadingSource::Weather).unwrap();

    assert_eq!(reading.thing, "backyard-wx");
    assert_eq!(reading.created, DateTime::from_timestamp(1_717_243_200, 0).unwrap());
    assert_eq!(reading.content["tempf"], serde_json::json!(72.5));
}

#[test]
fn test_dweet_failure_reason() {
    let response = DweetResponse::from_json_str(
        r#"{ "this": "failed", "with": 404, "because": "we couldn't find this" }"#,
    )
    .unwrap();

    match response.into_reading(ReadingSource::AirQuality) {
        Err(FeedError::Unsuccessful(reason)) => assert_eq!(reason, "we couldn't find this"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_dweet_empty_entries() {
    let response = DweetResponse::from_json_str(r#"{ "this": "succeeded", "with": [] }"#).unwrap();

    assert!(matches!(
        response.into_reading(ReadingSource::AirQuality),
        Err(FeedError::Empty(_))
    ));
}

#[test]
fn test_dweet_bad_created_is_a_payload_error() {
    let response = DweetResponse::from_json_str(
        r#"{ "this": "succeeded", "with": [{ "thing": "x", "created": "yesterday", "content": {} }] }"#,
    )
    .unwrap();

    assert!(matches!(
        response.into_reading(ReadingSource::Weather),
        Err(FeedError::Json(_))
    ));
}
