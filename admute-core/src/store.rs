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

//! Extension storage as seen by the core.

use crate::error::ConfigError;
use crate::subscription::Subscription;
use admute_types::{AdMuteSettings, SETTINGS_KEY};
use futures::future::LocalBoxFuture;
use log::{debug, info, warn};
use serde_json::Value;
use std::rc::Rc;

/// Callback for storage changes: key and new value (`None` when removed).
pub type ChangeListener = Rc<dyn Fn(&str, Option<&Value>)>;

/// An asynchronous key/value store holding JSON values, e.g. one
/// `chrome.storage` area.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> LocalBoxFuture<'static, Result<Option<Value>, ConfigError>>;

    fn set(&self, key: &str, value: Value) -> LocalBoxFuture<'static, Result<(), ConfigError>>;

    fn on_change(&self, listener: ChangeListener) -> Subscription;
}

/// Load the settings, falling back to defaults when the store is unreachable
/// or holds something unreadable. Never fails.
pub async fn load_settings(store: &dyn KeyValueStore) -> AdMuteSettings {
    match try_load_settings(store).await {
        Ok(Some(settings)) => {
            debug!("Loaded settings: {settings:?}");
            settings
        }
        Ok(None) => {
            info!("No stored settings, using defaults");
            AdMuteSettings::default()
        }
        Err(e) => {
            warn!("Failed to load settings, using defaults: {e}");
            AdMuteSettings::default()
        }
    }
}

pub async fn try_load_settings(
    store: &dyn KeyValueStore,
) -> Result<Option<AdMuteSettings>, ConfigError> {
    match store.get(SETTINGS_KEY).await? {
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(AdMuteSettings::from_stored(value)?)),
    }
}

pub async fn save_settings(
    store: &dyn KeyValueStore,
    settings: &AdMuteSettings,
) -> Result<(), ConfigError> {
    let value = serde_json::to_value(settings)?;
    store.set(SETTINGS_KEY, value).await
}
