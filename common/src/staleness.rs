// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};

use crate::{DeviceConfig, FeedTimestamps, LastUpdate, ReadingSource};

/// Returns whether a reading received at `last_update` is too old to trust at `now`.
///
/// A source that never delivered anything is always stale. If `now` lies before
/// `last_update` (NTP stepped the clock back, or the publisher's clock runs ahead)
/// the reading is treated as current and this returns `false`.
pub fn is_stale(now: DateTime<Utc>, last_update: LastUpdate, threshold_secs: u32) -> bool {
    let LastUpdate::At(at) = last_update else {
        return true;
    };

    if now < at {
        return false;
    }

    (now - at).num_seconds() >= i64::from(threshold_secs)
}

/// Applies [`is_stale`] to every source with its configured threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StalenessEvaluator {
    thresholds: [u32; ReadingSource::COUNT],
}

impl StalenessEvaluator {
    /// Uses the same alert threshold for every source.
    pub fn new(threshold_secs: u32) -> Self {
        Self {
            thresholds: [threshold_secs; ReadingSource::COUNT],
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.data_delay_alert_sec)
    }

    pub fn with_threshold(mut self, source: ReadingSource, threshold_secs: u32) -> Self {
        self.thresholds[source.index()] = threshold_secs;
        self
    }

    pub fn threshold(&self, source: ReadingSource) -> u32 {
        self.thresholds[source.index()]
    }

    pub fn is_stale(&self, source: ReadingSource, now: DateTime<Utc>, last_update: LastUpdate) -> bool {
        is_stale(now, last_update, self.threshold(source))
    }

    /// Recomputes the alert indicator of every source.
    pub fn evaluate(&self, now: DateTime<Utc>, timestamps: &FeedTimestamps) -> StaleAlerts {
        let mut alerts = StaleAlerts::default();
        for source in ReadingSource::ALL {
            alerts.0[source.index()] = self.is_stale(source, now, timestamps.last_update(source));
        }
        alerts
    }
}

/// Per-source "show stale-alert indicator" signal handed to the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaleAlerts([bool; ReadingSource::COUNT]);

impl StaleAlerts {
    pub fn is_stale(&self, source: ReadingSource) -> bool {
        self.0[source.index()]
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|stale| *stale)
    }

    pub fn stale_sources(&self) -> impl Iterator<Item = ReadingSource> + '_ {
        ReadingSource::ALL.into_iter().filter(|source| self.is_stale(*source))
    }

    /// The red warning label to draw for `source`, if any.
    pub fn indicator(&self, source: ReadingSource) -> Option<&'static str> {
        self.is_stale(source).then_some(source.stale_indicator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u32 = 1800;

    fn t() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_243_200, 0).unwrap()
    }

    fn ago(secs: i64) -> LastUpdate {
        LastUpdate::At(t() - chrono::TimeDelta::seconds(secs))
    }

    #[test]
    fn test_just_below_threshold_is_fresh() {
        assert!(!is_stale(t(), ago(1799), THRESHOLD));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_stale(t(), ago(1800), THRESHOLD));
        assert!(is_stale(t(), ago(3600), THRESHOLD));
    }

    #[test]
    fn test_unknown_is_always_stale() {
        assert!(is_stale(t(), LastUpdate::Unknown, THRESHOLD));
        assert!(is_stale(t(), LastUpdate::Unknown, 0));
        assert!(is_stale(t(), LastUpdate::Unknown, u32::MAX));
    }

    #[test]
    fn test_clock_skew_is_not_stale() {
        assert!(!is_stale(t(), ago(-60), THRESHOLD));
        assert!(!is_stale(t(), ago(-60), 0));
    }

    #[test]
    fn test_sub_second_remainder_is_truncated() {
        let last = LastUpdate::At(t() - chrono::TimeDelta::milliseconds(1_799_999));
        assert!(!is_stale(t(), last, THRESHOLD));
    }

    #[test]
    fn test_zero_threshold_is_stale_at_same_instant() {
        assert!(is_stale(t(), ago(0), 0));
    }

    #[test]
    fn test_monotonic_in_now() {
        let last = LastUpdate::At(t());
        let mut seen_stale = false;
        for offset in (-120..4000).step_by(7) {
            let now = t() + chrono::TimeDelta::seconds(offset);
            let stale = is_stale(now, last, THRESHOLD);
            assert!(!seen_stale || stale, "went fresh again at +{offset}s");
            seen_stale |= stale;
        }
        assert!(seen_stale);
    }

    #[test]
    fn test_evaluator_per_source_threshold() {
        let evaluator = StalenessEvaluator::new(THRESHOLD).with_threshold(ReadingSource::AirQuality, 600);
        let mut timestamps = FeedTimestamps::new();
        timestamps.record(ReadingSource::Weather, t() - chrono::TimeDelta::seconds(900));
        timestamps.record(ReadingSource::AirQuality, t() - chrono::TimeDelta::seconds(900));

        let alerts = evaluator.evaluate(t(), &timestamps);

        assert_eq!(evaluator.threshold(ReadingSource::Weather), THRESHOLD);
        assert!(!alerts.is_stale(ReadingSource::Weather));
        assert!(alerts.is_stale(ReadingSource::AirQuality));
        assert_eq!(alerts.indicator(ReadingSource::AirQuality), Some("AQ*"));
        assert_eq!(alerts.indicator(ReadingSource::Weather), None);
        assert_eq!(alerts.stale_sources().collect::<Vec<_>>(), vec![ReadingSource::AirQuality]);
    }

    #[test]
    fn test_evaluator_at_startup_flags_everything() {
        let evaluator = StalenessEvaluator::from_config(&DeviceConfig::default());
        let alerts = evaluator.evaluate(t(), &FeedTimestamps::new());

        assert!(alerts.is_stale(ReadingSource::Weather));
        assert!(alerts.is_stale(ReadingSource::AirQuality));
        assert!(alerts.any());
    }
}
