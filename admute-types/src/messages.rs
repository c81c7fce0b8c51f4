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

//! Messages exchanged over `chrome.runtime` / `chrome.tabs` messaging.
//!
//! Requests are internally tagged by their `action` field, which is the
//! shape the popup and background scripts send.

use crate::settings::AdMuteSettings;
use serde::{Deserialize, Serialize};

/// Requests handled by the content script running inside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ContentRequest {
    /// Liveness probe from the background script.
    Ping,
    /// Settings were saved; tear down and start again with fresh settings.
    UpdateSettings,
    /// The popup asks whether the page is being watched.
    GetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongResponse {
    pub pong: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettingsResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub enabled: bool,
    pub site: String,
}

/// Reply to a [`ContentRequest`]. Serialized without a tag, the receiving
/// side knows which request it sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentResponse {
    Pong(PongResponse),
    Updated(UpdateSettingsResponse),
    Status(StatusResponse),
}

impl ContentResponse {
    pub fn pong() -> Self {
        Self::Pong(PongResponse { pong: true })
    }

    pub fn updated() -> Self {
        Self::Updated(UpdateSettingsResponse { success: true })
    }

    pub fn status(enabled: bool, site: impl Into<String>) -> Self {
        Self::Status(StatusResponse {
            enabled,
            site: site.into(),
        })
    }
}

/// Requests handled by the background script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundRequest {
    GetSettings,
    SaveSettings { settings: AdMuteSettings },
    /// Sent by a content script each time an ad starts. No reply expected.
    LogAdDetected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveSettingsResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_requests_use_action_tag() {
        let ping: ContentRequest = serde_json::from_value(json!({ "action": "ping" })).unwrap();
        assert_eq!(ping, ContentRequest::Ping);

        let update: ContentRequest =
            serde_json::from_value(json!({ "action": "updateSettings" })).unwrap();
        assert_eq!(update, ContentRequest::UpdateSettings);

        let status: ContentRequest =
            serde_json::from_value(json!({ "action": "getStatus" })).unwrap();
        assert_eq!(status, ContentRequest::GetStatus);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_value::<ContentRequest>(json!({ "action": "reboot" })).is_err());
    }

    #[test]
    fn responses_serialize_without_tag() {
        assert_eq!(
            serde_json::to_value(ContentResponse::pong()).unwrap(),
            json!({ "pong": true })
        );
        assert_eq!(
            serde_json::to_value(ContentResponse::updated()).unwrap(),
            json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(ContentResponse::status(true, "www.youtube.com")).unwrap(),
            json!({ "enabled": true, "site": "www.youtube.com" })
        );
    }

    #[test]
    fn log_ad_detected_shape() {
        assert_eq!(
            serde_json::to_value(BackgroundRequest::LogAdDetected).unwrap(),
            json!({ "action": "logAdDetected" })
        );
    }

    #[test]
    fn save_settings_carries_partial_settings() {
        let request: BackgroundRequest = serde_json::from_value(json!({
            "action": "saveSettings",
            "settings": { "enabled": false }
        }))
        .unwrap();
        match request {
            BackgroundRequest::SaveSettings { settings } => {
                assert!(!settings.enabled);
                assert_eq!(settings.mute_delay, 1000);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn failed_save_includes_error() {
        assert_eq!(
            serde_json::to_value(SaveSettingsResponse::failed("quota")).unwrap(),
            json!({ "success": false, "error": "quota" })
        );
        assert_eq!(
            serde_json::to_value(SaveSettingsResponse::ok()).unwrap(),
            json!({ "success": true })
        );
    }
}
