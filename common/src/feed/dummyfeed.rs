// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::feed::{Reading, ReadingFeed};
use crate::{FeedError, ReadingSource};

#[derive(Deserialize)]
struct DummyEntry {
    source: ReadingSource,
    thing: String,
    /// How far behind the clock every reading of this entry is.
    lag_secs: i64,
    #[serde(default)]
    content: serde_json::Map<String, serde_json::Value>,
}

/// Offline feed serving canned readings, for running without a network.
#[derive(Deserialize)]
pub struct DummyFeed {
    entries: Vec<DummyEntry>,
    #[serde(skip, default = "system_clock")]
    clock: fn() -> DateTime<Utc>,
}

fn system_clock() -> fn() -> DateTime<Utc> {
    Utc::now
}

impl DummyFeed {
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyfeed.json");

        serde_json::from_str::<Self>(json_data)
    }

    /// Replaces the wall clock the readings are stamped against.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

impl ReadingFeed for DummyFeed {
    fn latest(&mut self, source: ReadingSource) -> Result<Option<Reading>, FeedError> {
        let now = (self.clock)();

        Ok(self.entries.iter().find(|entry| entry.source == source).map(|entry| Reading {
            source,
            thing: entry.thing.clone(),
            created: now - TimeDelta::seconds(entry.lag_secs),
            content: entry.content.clone(),
        }))
    }
}

#[test]
fn test_dummy_feed() {
    fn fixed_clock() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_243_200, 0).unwrap()
    }

    let mut feed = DummyFeed::new().unwrap().with_clock(fixed_clock);

    let weather = feed.latest(ReadingSource::Weather).unwrap().unwrap();
    assert_eq!(weather.thing, "dummy-weather-station");
    assert_eq!((fixed_clock() - weather.created).num_seconds(), 90);
    assert_eq!(weather.content["humidity"], serde_json::json!(52));

    let air_quality = feed.latest(ReadingSource::AirQuality).unwrap().unwrap();
    assert_eq!((fixed_clock() - air_quality.created).num_seconds(), 2700);
}
