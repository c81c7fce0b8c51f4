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

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Storage key the settings object lives under in `chrome.storage.sync`.
pub const SETTINGS_KEY: &str = "adMuteSettings";

/// Delay between an ad being detected and the videos being muted.
pub const DEFAULT_MUTE_DELAY_MS: u32 = 1000;

/// Longest delay a browser timer honours. `setTimeout` treats anything
/// above `i32::MAX` ms as 1 ms.
pub const MAX_MUTE_DELAY_MS: u32 = i32::MAX as u32;

/// Domains the extension runs on unless the user edits the list.
pub const DEFAULT_SITES: [&str; 4] = ["tving.com", "youtube.com", "netflix.com", "wavve.com"];

/// User-editable extension settings.
///
/// Missing fields in a stored object fall back to the defaults one by one, so
/// an object written by an older version still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdMuteSettings {
    pub enabled: bool,
    /// Milliseconds between ad detection and muting. Never negative.
    #[serde(deserialize_with = "deserialize_mute_delay")]
    pub mute_delay: u32,
    pub sites: BTreeSet<String>,
    pub show_notifications: bool,
}

impl Default for AdMuteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mute_delay: DEFAULT_MUTE_DELAY_MS,
            sites: DEFAULT_SITES.iter().map(|site| site.to_string()).collect(),
            show_notifications: true,
        }
    }
}

impl AdMuteSettings {
    /// Whether `hostname` belongs to one of the configured sites.
    ///
    /// Matching is by substring so `www.youtube.com` and `m.youtube.com`
    /// both match `youtube.com`.
    pub fn covers_host(&self, hostname: &str) -> bool {
        self.sites
            .iter()
            .any(|site| !site.is_empty() && hostname.contains(site.as_str()))
    }

    /// Parse a stored settings value, merging it over the defaults.
    pub fn from_stored(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Stored delays come from a JS number, so they may be fractional, negative
/// or out of range. Clamp into `0..=MAX_MUTE_DELAY_MS` instead of rejecting
/// the whole settings object.
fn deserialize_mute_delay<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw <= 0.0 {
        return Ok(0);
    }
    Ok(raw.round().min(f64::from(MAX_MUTE_DELAY_MS)) as u32)
}
