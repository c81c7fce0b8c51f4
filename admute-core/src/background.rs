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

//! Background script logic: default settings on install, the settings
//! relay between popup and tabs, and the ad counter.

use crate::error::ConfigError;
use crate::messaging::TabMessenger;
use crate::store::{save_settings, KeyValueStore};
use crate::subscription::Subscription;
use admute_types::{
    AdDetectionStats, AdMuteSettings, BackgroundRequest, ContentRequest, SaveSettingsResponse,
    DEFAULT_SITES, SETTINGS_KEY, STATS_KEY,
};
use chrono::{SecondsFormat, Utc};
use log::{debug, error, info};
use serde_json::{json, Value};
use std::rc::Rc;

pub struct Background {
    sync: Rc<dyn KeyValueStore>,
    local: Rc<dyn KeyValueStore>,
    tabs: Rc<dyn TabMessenger>,
}

impl Background {
    /// `sync` holds the settings, `local` the detection counters.
    pub fn new(
        sync: Rc<dyn KeyValueStore>,
        local: Rc<dyn KeyValueStore>,
        tabs: Rc<dyn TabMessenger>,
    ) -> Self {
        Self { sync, local, tabs }
    }

    /// Write default settings unless some are already stored. Returns
    /// whether defaults were written.
    pub async fn on_installed(&self) -> Result<bool, ConfigError> {
        info!("Extension installed or updated");
        self.ensure_defaults().await
    }

    /// The install event can fire before the worker has registered its
    /// listeners, so startup runs the same check.
    pub async fn ensure_defaults(&self) -> Result<bool, ConfigError> {
        if self.sync.get(SETTINGS_KEY).await?.is_some() {
            return Ok(false);
        }
        save_settings(&*self.sync, &AdMuteSettings::default()).await?;
        info!("Default settings saved");
        Ok(true)
    }

    /// A tab finished loading. On a supported site, ping its content script
    /// so the log shows whether it is alive. Returns whether the tab is on a
    /// supported site.
    pub fn on_tab_updated(&self, tab_id: i32, status: Option<&str>, url: Option<&str>) -> bool {
        if status != Some("complete") {
            return false;
        }
        let Some(host) = url.and_then(supported_host) else {
            return false;
        };
        info!("Supported site loaded: {host}");
        if let Err(e) = self.tabs.send_to_tab(tab_id, &ContentRequest::Ping) {
            debug!("Content script not loaded yet in tab {tab_id}: {e}");
        }
        true
    }

    /// Handle a runtime message. Returns the reply to send, if any.
    pub async fn handle(&self, request: BackgroundRequest, sender_url: Option<&str>) -> Option<Value> {
        match request {
            BackgroundRequest::GetSettings => Some(self.stored_settings().await),
            BackgroundRequest::SaveSettings { settings } => {
                let response = self.save_and_broadcast(&settings).await;
                serde_json::to_value(response).ok()
            }
            BackgroundRequest::LogAdDetected => {
                info!(
                    "Ad detected on {}",
                    sender_url.unwrap_or("an unknown page")
                );
                if let Err(e) = self.record_ad_detected().await {
                    error!("Failed to update detection stats: {e}");
                }
                None
            }
        }
    }

    /// Log every change to the settings key.
    pub fn watch_settings(&self) -> Subscription {
        self.sync.on_change(Rc::new(|key: &str, value: Option<&Value>| {
            if key == SETTINGS_KEY {
                info!("Settings changed: {value:?}");
            }
        }))
    }

    pub async fn detection_stats(&self) -> Result<AdDetectionStats, ConfigError> {
        match self.local.get(STATS_KEY).await? {
            Some(Value::Null) | None => Ok(AdDetectionStats::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn stored_settings(&self) -> Value {
        match self.sync.get(SETTINGS_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => json!({}),
            Err(e) => {
                error!("Failed to read settings: {e}");
                json!({})
            }
        }
    }

    async fn save_and_broadcast(&self, settings: &AdMuteSettings) -> SaveSettingsResponse {
        if let Err(e) = save_settings(&*self.sync, settings).await {
            error!("Failed to save settings: {e}");
            return SaveSettingsResponse::failed(e.to_string());
        }
        info!("Settings saved");
        self.tabs.broadcast(&ContentRequest::UpdateSettings);
        SaveSettingsResponse::ok()
    }

    async fn record_ad_detected(&self) -> Result<AdDetectionStats, ConfigError> {
        let mut stats = self.detection_stats().await.unwrap_or_else(|e| {
            debug!("Resetting unreadable detection stats: {e}");
            AdDetectionStats::default()
        });
        stats.record(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        self.local
            .set(STATS_KEY, serde_json::to_value(&stats)?)
            .await?;
        Ok(stats)
    }
}

/// Host of `url` when it belongs to one of the supported streaming sites.
pub fn supported_host(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    DEFAULT_SITES
        .iter()
        .any(|site| host.contains(site))
        .then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_host_checks_known_sites() {
        assert_eq!(
            supported_host("https://www.youtube.com/watch?v=abc").as_deref(),
            Some("www.youtube.com")
        );
        assert_eq!(
            supported_host("https://www.wavve.com/player").as_deref(),
            Some("www.wavve.com")
        );
        assert_eq!(supported_host("https://example.org/"), None);
        assert_eq!(supported_host("chrome://extensions"), None);
        assert_eq!(supported_host("not a url"), None);
    }
}
