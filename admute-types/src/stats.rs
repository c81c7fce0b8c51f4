/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use serde::{Deserialize, Serialize};

/// Storage key of the detection counters in `chrome.storage.local`.
pub const STATS_KEY: &str = "adDetectionStats";

/// Running count of ads seen across all tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdDetectionStats {
    pub count: u64,
    /// RFC 3339 timestamp of the most recent detection.
    pub last_detected: Option<String>,
}

impl AdDetectionStats {
    pub fn record(&mut self, at: String) {
        self.count = self.count.saturating_add(1);
        self.last_detected = Some(at);
    }
}
