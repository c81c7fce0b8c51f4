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

//! Types shared between the content script, the background script and the
//! settings popup of the Ad Mute extension.
//!
//! Everything in here crosses a JS boundary as JSON, so field names follow
//! the camelCase the extension has always stored and sent.

pub mod messages;
pub mod settings;
pub mod stats;

pub use messages::{
    BackgroundRequest, ContentRequest, ContentResponse, PongResponse, SaveSettingsResponse,
    StatusResponse, UpdateSettingsResponse,
};
pub use settings::{
    AdMuteSettings, DEFAULT_MUTE_DELAY_MS, DEFAULT_SITES, MAX_MUTE_DELAY_MS, SETTINGS_KEY,
};
pub use stats::{AdDetectionStats, STATS_KEY};
