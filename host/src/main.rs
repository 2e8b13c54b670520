use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use wxaq_cyd_common::feed::{DummyFeed, ReadingFeedPointer};
use wxaq_cyd_common::{DeviceConfig, FeedTimestamps, ReadingSource, Secrets, StaleAlerts, StalenessEvaluator};

/// Our App struct that holds the configuration, the feed and the per-source timestamps.
///
/// Every refresh tick polls the feed for each source, records what arrived and
/// recomputes the stale indicators. Everything runs on the one loop.
struct App {
    config: DeviceConfig,
    evaluator: StalenessEvaluator,
    feed: ReadingFeedPointer,
    timestamps: FeedTimestamps,
    alerts: Option<StaleAlerts>,
}

impl App {
    const REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

    /// Create a new App struct from an already validated configuration.
    fn new(config: DeviceConfig, feed: ReadingFeedPointer) -> Self {
        let evaluator = StalenessEvaluator::from_config(&config);

        Self {
            config,
            evaluator,
            feed,
            timestamps: FeedTimestamps::new(),
            alerts: None,
        }
    }

    /// Runs one refresh cycle at `now` and returns the indicators to draw.
    fn tick(&mut self, now: DateTime<Utc>) -> StaleAlerts {
        for source in ReadingSource::ALL {
            match self.feed.latest(source) {
                Ok(Some(reading)) => {
                    debug!("{source} reading from {} created {}", reading.thing, reading.created);
                    self.timestamps.record(source, reading.created);
                }
                Ok(None) => debug!("No {source} reading published yet"),
                // Keep the previous timestamp, staleness will catch up with it.
                Err(e) => warn!("Fetching {source} reading failed: {e}"),
            }
        }

        let alerts = self.evaluator.evaluate(now, &self.timestamps);
        self.log_transitions(&alerts);
        self.alerts = Some(alerts);

        alerts
    }

    fn log_transitions(&self, alerts: &StaleAlerts) {
        let offset = self.config.ntp.display_offset();

        for source in ReadingSource::ALL {
            let stale = alerts.is_stale(source);
            if self.alerts.map(|previous| previous.is_stale(source)) == Some(stale) {
                continue;
            }

            let last = match self.timestamps.last_update(source).timestamp() {
                Some(at) => at.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S").to_string(),
                None => "never".into(),
            };

            if stale {
                warn!(
                    "{} {source} data is stale (last update {last}, threshold {}s)",
                    source.stale_indicator(),
                    self.evaluator.threshold(source)
                );
            } else {
                info!("{} {source} data is current (last update {last})", source.label());
            }
        }
    }

    /// Run the App, refreshing every `REFRESH_INTERVAL` until the process is stopped.
    fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.tick(Utc::now());
            std::thread::sleep(Self::REFRESH_INTERVAL);
        }
    }
}

/// Loads the device configuration from the JSON file named by the first argument,
/// or the board defaults if none is given.
fn load_config() -> anyhow::Result<DeviceConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("No config file given, using board defaults");
        return Ok(DeviceConfig::default());
    };

    let json = std::fs::read_to_string(&path).map_err(|e| anyhow::anyhow!("Reading {path}: {e}"))?;
    let config = DeviceConfig::from_json_str(&json)?;
    info!("Loaded config from {path}");

    Ok(config)
}

/// A minimal main function that initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = load_config()?;
    debug!("{config:?}");

    // There is no HTTP client on the host, so the dummy feed serves the readings.
    // Secrets are still checked so a deployment can be validated before flashing.
    match Secrets::from_env() {
        Ok(secrets) => info!(
            "Secrets ok for wifi {}, feeds {} and {}",
            secrets.wifi_ssid,
            secrets.thing_name(ReadingSource::Weather),
            secrets.thing_name(ReadingSource::AirQuality)
        ),
        Err(e) => warn!("{e}, continuing with the dummy feed"),
    }

    let feed: ReadingFeedPointer = Box::new(DummyFeed::new()?);

    let mut app = App::new(config, feed);

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxaq_cyd_common::feed::{Reading, ReadingFeed};
    use wxaq_cyd_common::FeedError;

    fn fixed_clock() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_243_200, 0).unwrap()
    }

    #[test]
    fn test_tick_with_dummy_feed() {
        let feed = DummyFeed::new().unwrap().with_clock(fixed_clock);
        let mut app = App::new(DeviceConfig::default(), Box::new(feed));

        let alerts = app.tick(fixed_clock());

        assert!(!alerts.is_stale(ReadingSource::Weather));
        assert!(alerts.is_stale(ReadingSource::AirQuality));
        assert_eq!(alerts.indicator(ReadingSource::AirQuality), Some("AQ*"));
    }

    /// Delivers one weather reading, then fails on every call.
    struct FlakyFeed {
        calls: usize,
    }

    impl ReadingFeed for FlakyFeed {
        fn latest(&mut self, source: ReadingSource) -> Result<Option<Reading>, FeedError> {
            self.calls += 1;
            match (source, self.calls) {
                (ReadingSource::Weather, 1) => Ok(Some(Reading {
                    source,
                    thing: "backyard-wx".into(),
                    created: fixed_clock(),
                    content: Default::default(),
                })),
                (ReadingSource::AirQuality, 2) => Ok(None),
                _ => Err(FeedError::Unsuccessful("offline".into())),
            }
        }
    }

    #[test]
    fn test_failed_fetch_keeps_last_timestamp() {
        let mut app = App::new(DeviceConfig::default(), Box::new(FlakyFeed { calls: 0 }));

        let alerts = app.tick(fixed_clock() + chrono::TimeDelta::seconds(60));
        assert!(!alerts.is_stale(ReadingSource::Weather));
        assert!(alerts.is_stale(ReadingSource::AirQuality));

        let alerts = app.tick(fixed_clock() + chrono::TimeDelta::seconds(1799));
        assert!(!alerts.is_stale(ReadingSource::Weather));

        let alerts = app.tick(fixed_clock() + chrono::TimeDelta::seconds(1800));
        assert!(alerts.is_stale(ReadingSource::Weather));
    }
}
