// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

/// Errors raised while building the startup configuration or the secrets.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Screen rotation must be 0-3, got {0}")]
    InvalidRotation(u8),

    #[error("GPIO{0} does not exist on the ESP32")]
    InvalidPin(u8),

    #[error("GPIO{pin} is assigned to both {first} and {second}")]
    PinConflict {
        pin: u8,
        first: &'static str,
        second: &'static str,
    },

    #[error("GPIO{pin} is input-only and cannot drive {role}")]
    InputOnlyPin { pin: u8, role: &'static str },

    #[error("NTP server hostname is empty")]
    EmptyNtpServer,

    #[error("Missing secret: {0}")]
    MissingSecret(&'static str),

    #[error("Secret {0} still holds the template placeholder")]
    PlaceholderSecret(&'static str),

    #[error("Feed URL for {key} must start with http:// or https://, got {url}")]
    InvalidFeedUrl { key: &'static str, url: String },
}

/// Errors raised while decoding a reading received from a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Invalid feed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feed request did not succeed: {0}")]
    Unsuccessful(String),

    #[error("Feed returned no readings for {0}")]
    Empty(String),
}
