mod config;
mod error;
mod pins;
mod secrets;
mod source;
mod staleness;

pub mod feed;

pub use config::{DeviceConfig, DisplayConfig, NtpConfig, Rgb565, Rotation};
pub use error::{ConfigError, FeedError};
pub use pins::{GpioPin, I2cPins, PinMap, TftPins, TouchPins};
pub use secrets::Secrets;
pub use source::{FeedTimestamps, LastUpdate, ReadingSource};
pub use staleness::{is_stale, StaleAlerts, StalenessEvaluator};
