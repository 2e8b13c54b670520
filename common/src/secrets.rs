// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use crate::{ConfigError, ReadingSource};

const WIFI_SSID: &str = "WIFI_SSID";
const WIFI_PASS: &str = "WIFI_PASS";
const WEATHER_URL: &str = "WXDWEETURL";
const AIR_QUALITY_URL: &str = "AQDWEETURL";

/// Values shipped in the secrets template. Seeing one of these means the
/// deployer never filled the template in.
const PLACEHOLDERS: &[&str] = &[
    "YOUR-WIFI-SSID",
    "YOUR-WIFI-PASSWORD",
    "http://dweet.io/get/latest/dweet/for/your-weather-station",
    "http://dweet.io/get/latest/dweet/for/your-aqi-monitor",
];

/// Deployment specific credentials and feed locations.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub wifi_ssid: String,
    pub wifi_passphrase: String,
    pub weather_feed_url: String,
    pub air_quality_feed_url: String,
}

impl Secrets {
    /// Reads `WIFI_SSID`, `WIFI_PASS`, `WXDWEETURL` and `AQDWEETURL` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingSecret(key))?;
            if PLACEHOLDERS.contains(&value.as_str()) {
                return Err(ConfigError::PlaceholderSecret(key));
            }
            Ok(value)
        };

        let secrets = Self {
            wifi_ssid: get(WIFI_SSID)?,
            wifi_passphrase: get(WIFI_PASS)?,
            weather_feed_url: get(WEATHER_URL)?,
            air_quality_feed_url: get(AIR_QUALITY_URL)?,
        };

        for (key, url) in [
            (WEATHER_URL, &secrets.weather_feed_url),
            (AIR_QUALITY_URL, &secrets.air_quality_feed_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidFeedUrl { key, url: url.clone() });
            }
        }

        Ok(secrets)
    }

    pub fn feed_url(&self, source: ReadingSource) -> &str {
        match source {
            ReadingSource::Weather => &self.weather_feed_url,
            ReadingSource::AirQuality => &self.air_quality_feed_url,
        }
    }

    /// The dweet thing name, i.e. the last path segment of the feed URL.
    pub fn thing_name(&self, source: ReadingSource) -> &str {
        let url = self.feed_url(source).trim_end_matches('/');
        url.rsplit('/').next().unwrap_or(url)
    }
}

impl core::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Secrets")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_passphrase", &"<redacted>")
            .field("weather_feed_url", &self.weather_feed_url)
            .field("air_quality_feed_url", &self.air_quality_feed_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    fn valid() -> Vec<(&'static str, &'static str)> {
        vec![
            (WIFI_SSID, "home"),
            (WIFI_PASS, "hunter22"),
            (WEATHER_URL, "http://dweet.io/get/latest/dweet/for/backyard-wx"),
            (AIR_QUALITY_URL, "https://dweet.io/get/latest/dweet/for/porch-aq/"),
        ]
    }

    #[test]
    fn test_from_lookup() {
        let secrets = Secrets::from_lookup(lookup(&valid())).unwrap();

        assert_eq!(secrets.wifi_ssid, "home");
        assert_eq!(secrets.thing_name(ReadingSource::Weather), "backyard-wx");
        assert_eq!(secrets.thing_name(ReadingSource::AirQuality), "porch-aq");
    }

    #[test]
    fn test_missing_secret() {
        let mut pairs = valid();
        pairs.retain(|(key, _)| *key != WIFI_PASS);

        let err = Secrets::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("WIFI_PASS")));
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let mut pairs = valid();
        pairs[0] = (WIFI_SSID, "  ");

        let err = Secrets::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("WIFI_SSID")));
    }

    #[test]
    fn test_template_placeholder_rejected() {
        let mut pairs = valid();
        pairs[2] = (WEATHER_URL, "http://dweet.io/get/latest/dweet/for/your-weather-station");

        let err = Secrets::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::PlaceholderSecret("WXDWEETURL")));
    }

    #[test]
    fn test_non_http_feed_url_rejected() {
        let mut pairs = valid();
        pairs[3] = (AIR_QUALITY_URL, "dweet.io/for/porch-aq");

        let err = Secrets::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFeedUrl { key: "AQDWEETURL", .. }));
    }

    #[test]
    fn test_debug_hides_passphrase() {
        let secrets = Secrets::from_lookup(lookup(&valid())).unwrap();
        let debug = format!("{secrets:?}");

        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("<redacted>"));
    }
}
