// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, PinMap};

/// A colour packed as 5 bits red, 6 bits green, 5 bits blue.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);

    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3))
    }

    /// Widens back to 8 bits per channel, replicating the high bits into the low ones.
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

/// Panel orientation in quarter turns.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rotation {
    Portrait,
    Landscape,
    PortraitFlipped,
    /// Puts (0, 0) next to the USB connector on the CYD.
    #[default]
    LandscapeFlipped,
}

impl TryFrom<u8> for Rotation {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::Portrait),
            1 => Ok(Rotation::Landscape),
            2 => Ok(Rotation::PortraitFlipped),
            3 => Ok(Rotation::LandscapeFlipped),
            other => Err(ConfigError::InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation as u8
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub background: Rgb565,
    pub rotation: Rotation,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            background: Rgb565(0x0006),
            rotation: Rotation::LandscapeFlipped,
        }
    }
}

/// Time synchronisation settings.
///
/// Feed timestamps are published in GMT, so the clock itself is kept in GMT
/// and the offsets only matter when a time is shown to the user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NtpConfig {
    pub server: String,
    pub gmt_offset_sec: i32,
    pub daylight_offset_sec: i32,
}

impl Default for NtpConfig {
    fn default() -> Self {
        Self {
            server: "pool.ntp.org".into(),
            gmt_offset_sec: 0,
            daylight_offset_sec: 3600,
        }
    }
}

impl NtpConfig {
    /// Offset to apply when formatting clock times for the display.
    pub fn display_offset(&self) -> FixedOffset {
        let secs = self.gmt_offset_sec.saturating_add(self.daylight_offset_sec);
        FixedOffset::east_opt(secs).unwrap_or_else(|| {
            log::warn!("Display offset {secs}s out of range, falling back to GMT");
            Utc.fix()
        })
    }
}

/// Device configuration, built once at startup and never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub display: DisplayConfig,
    pub ntp: NtpConfig,
    /// Age in seconds after which a source gets its warning indicator.
    pub data_delay_alert_sec: u32,
    pub pins: PinMap,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            ntp: NtpConfig::default(),
            data_delay_alert_sec: 1800,
            pins: PinMap::default(),
        }
    }
}

impl DeviceConfig {
    /// Overlays `json` on the defaults and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ntp.server.trim().is_empty() {
            return Err(ConfigError::EmptyNtpServer);
        }
        self.pins.validate()
    }
}

#[test]
fn test_default_config_matches_board() {
    let config = DeviceConfig::default();
    config.validate().unwrap();

    assert_eq!(config.display.background, Rgb565(0x0006));
    assert_eq!(u8::from(config.display.rotation), 3);
    assert_eq!(config.ntp.server, "pool.ntp.org");
    assert_eq!(config.ntp.gmt_offset_sec, 0);
    assert_eq!(config.ntp.daylight_offset_sec, 3600);
    assert_eq!(config.data_delay_alert_sec, 1800);
    assert_eq!(config.pins.i2c.sda.number(), 22);
    assert_eq!(config.pins.tft.dc.number(), 2);
}

#[test]
fn test_json_overlay_keeps_defaults() {
    let config = DeviceConfig::from_json_str(
        r#"{
            "display": { "rotation": 1 },
            "data_delay_alert_sec": 900,
            "pins": { "tft": { "backlight": 27, "cs": 15, "dc": 2, "miso": 12, "mosi": 13, "sclk": 14 },
                      "i2c": { "sda": 22, "scl": 21 } }
        }"#,
    )
    .unwrap();

    assert_eq!(config.display.rotation, Rotation::Landscape);
    assert_eq!(config.display.background, Rgb565(0x0006));
    assert_eq!(config.data_delay_alert_sec, 900);
    assert_eq!(config.ntp, NtpConfig::default());
    assert_eq!(config.pins.tft.backlight.number(), 27);
    assert_eq!(config.pins.touch.irq.number(), 36);
}

#[test]
fn test_json_partial_pin_group_overlay() {
    let config = DeviceConfig::from_json_str(r#"{ "pins": { "tft": { "backlight": 27 } } }"#).unwrap();

    assert_eq!(config.pins.tft.backlight.number(), 27);
    assert_eq!(config.pins.tft.sclk.number(), 14);
    assert_eq!(config.pins.i2c.scl.number(), 27);
}

#[test]
fn test_json_rejects_unknown_keys() {
    let err = DeviceConfig::from_json_str(r#"{ "data_delay_alert_secs": 60 }"#).unwrap_err();
    assert!(err.to_string().contains("unknown field"), "{err}");
}

#[test]
fn test_json_rejects_bad_rotation() {
    let err = DeviceConfig::from_json_str(r#"{ "display": { "rotation": 4 } }"#).unwrap_err();
    assert!(err.to_string().contains("rotation"), "{err}");
}

#[test]
fn test_json_rejects_pin_conflict() {
    let err = DeviceConfig::from_json_str(r#"{ "pins": { "i2c": { "sda": 21, "scl": 27 } } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::PinConflict { pin: 21, .. }), "{err}");
}

#[test]
fn test_json_rejects_empty_ntp_server() {
    let err = DeviceConfig::from_json_str(r#"{ "ntp": { "server": " " } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyNtpServer));
}

#[test]
fn test_display_offset() {
    assert_eq!(NtpConfig::default().display_offset().local_minus_utc(), 3600);
}

#[test]
fn test_rgb565_conversion() {
    assert_eq!(Rgb565::from_rgb888(255, 0, 0), Rgb565::RED);
    assert_eq!(Rgb565::from_rgb888(255, 255, 255), Rgb565::WHITE);
    assert_eq!(Rgb565::WHITE.to_rgb888(), (255, 255, 255));
    assert_eq!(Rgb565(0x0006).to_rgb888(), (0, 0, 49));
}
