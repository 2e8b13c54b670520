// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote feed whose latest value is shown on the display.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    Weather,
    AirQuality,
}

impl ReadingSource {
    pub const COUNT: usize = 2;
    pub const ALL: [ReadingSource; Self::COUNT] = [ReadingSource::Weather, ReadingSource::AirQuality];

    pub(crate) const fn index(self) -> usize {
        match self {
            ReadingSource::Weather => 0,
            ReadingSource::AirQuality => 1,
        }
    }

    /// Short label drawn in the lower right corner of the screen.
    pub const fn label(self) -> &'static str {
        match self {
            ReadingSource::Weather => "WX",
            ReadingSource::AirQuality => "AQ",
        }
    }

    /// Label drawn in red while the source is stale.
    pub const fn stale_indicator(self) -> &'static str {
        match self {
            ReadingSource::Weather => "WX*",
            ReadingSource::AirQuality => "AQ*",
        }
    }
}

impl core::fmt::Display for ReadingSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadingSource::Weather => f.write_str("weather"),
            ReadingSource::AirQuality => f.write_str("air quality"),
        }
    }
}

/// GMT time of the most recent reading received from a source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LastUpdate {
    /// Nothing received yet. Always stale.
    #[default]
    Unknown,
    At(DateTime<Utc>),
}

impl LastUpdate {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            LastUpdate::Unknown => None,
            LastUpdate::At(at) => Some(*at),
        }
    }
}

/// Last update time of every source.
///
/// Written by the fetch side whenever a reading arrives, read by the staleness
/// evaluator. Both run on the same refresh loop, so there is no locking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedTimestamps([LastUpdate; ReadingSource::COUNT]);

impl FeedTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `at` as the time of the latest reading from `source`.
    pub fn record(&mut self, source: ReadingSource, at: DateTime<Utc>) {
        let slot = &mut self.0[source.index()];
        if let LastUpdate::At(previous) = *slot {
            if at < previous {
                log::debug!("{source} timestamp moved backwards: {previous} -> {at}");
            }
        }
        *slot = LastUpdate::At(at);
    }

    pub fn last_update(&self, source: ReadingSource) -> LastUpdate {
        self.0[source.index()]
    }
}

#[test]
fn test_feed_timestamps_start_unknown() {
    let timestamps = FeedTimestamps::new();

    for source in ReadingSource::ALL {
        assert_eq!(timestamps.last_update(source), LastUpdate::Unknown);
    }
}

#[test]
fn test_feed_timestamps_record() {
    let mut timestamps = FeedTimestamps::new();
    let first = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let second = DateTime::from_timestamp(1_700_000_300, 0).unwrap();

    timestamps.record(ReadingSource::Weather, first);
    timestamps.record(ReadingSource::Weather, second);

    assert_eq!(timestamps.last_update(ReadingSource::Weather), LastUpdate::At(second));
    assert_eq!(timestamps.last_update(ReadingSource::AirQuality), LastUpdate::Unknown);
}

#[test]
fn test_reading_source_serde_names() {
    let source: ReadingSource = serde_json::from_str("\"air_quality\"").unwrap();
    assert_eq!(source, ReadingSource::AirQuality);
    assert_eq!(source.stale_indicator(), "AQ*");
}
