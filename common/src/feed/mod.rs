// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

mod dummyfeed;
mod dweet;
mod readingfeed;

pub use dummyfeed::DummyFeed;
pub use dweet::{DweetEntry, DweetResponse};
pub use readingfeed::{Reading, ReadingFeed, ReadingFeedPointer};
