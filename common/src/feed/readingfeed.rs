// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FeedError, ReadingSource};

/// The latest value published for a source.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reading {
    pub source: ReadingSource,
    pub thing: String,
    /// When the publisher sent the value, in GMT.
    pub created: DateTime<Utc>,
    pub content: serde_json::Map<String, serde_json::Value>,
}

pub type ReadingFeedPointer = Box<dyn ReadingFeed + Send>;

/// Fetches the most recent reading of a source.
///
/// Implemented by whatever talks to the publishing service. `Ok(None)` means the
/// service answered but has nothing for the source yet.
pub trait ReadingFeed {
    fn latest(&mut self, source: ReadingSource) -> Result<Option<Reading>, FeedError>;
}
