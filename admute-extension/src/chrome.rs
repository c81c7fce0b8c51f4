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

//! Bindings to the `chrome.*` extension APIs and the core adapters built on
//! them.

use crate::dom::js_error;
use admute_core::store::ChangeListener;
use admute_core::{ConfigError, KeyValueStore, MessageChannel, MessagingError, Subscription, TabMessenger};
use admute_types::{BackgroundRequest, ContentRequest};
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Function, Object, Promise, Reflect};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, Debug)]
    pub type StorageArea;

    #[wasm_bindgen(method, catch)]
    fn get(this: &StorageArea, keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn set(this: &StorageArea, items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage"], js_name = sync, thread_local_v2)]
    static SYNC_AREA: StorageArea;

    #[wasm_bindgen(js_namespace = ["chrome", "storage"], js_name = local, thread_local_v2)]
    static LOCAL_AREA: StorageArea;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_listener(callback: &Function);

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = removeListener)]
    fn remove_storage_listener(callback: &Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    fn runtime_send_message(message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    pub fn add_message_listener(callback: &Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = addListener)]
    pub fn add_installed_listener(callback: &Function);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage, catch)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query, catch)]
    fn tabs_query(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    pub fn add_tab_updated_listener(callback: &Function);
}

/// Serialize for the extension APIs: maps become plain objects.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// `sender` argument of `runtime.onMessage`.
#[derive(Debug, Default, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<Tab>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `changeInfo` argument of `tabs.onUpdated`.
#[derive(Debug, Default, Deserialize)]
pub struct TabChangeInfo {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Sync,
    Local,
}

impl Area {
    fn name(self) -> &'static str {
        match self {
            Area::Sync => "sync",
            Area::Local => "local",
        }
    }

    fn handle(self) -> StorageArea {
        match self {
            Area::Sync => SYNC_AREA.with(StorageArea::clone),
            Area::Local => LOCAL_AREA.with(StorageArea::clone),
        }
    }
}

/// One `chrome.storage` area as a [`KeyValueStore`].
#[derive(Clone, Copy, Debug)]
pub struct ChromeStorage {
    area: Area,
}

impl ChromeStorage {
    pub fn sync() -> Self {
        Self { area: Area::Sync }
    }

    pub fn local() -> Self {
        Self { area: Area::Local }
    }
}

fn unavailable(e: JsValue) -> ConfigError {
    ConfigError::Unavailable(js_error(&e))
}

impl KeyValueStore for ChromeStorage {
    fn get(&self, key: &str) -> LocalBoxFuture<'static, Result<Option<Value>, ConfigError>> {
        let area = self.area.handle();
        let key = key.to_string();
        async move {
            let promise = area.get(&JsValue::from_str(&key)).map_err(unavailable)?;
            let items = JsFuture::from(promise).await.map_err(unavailable)?;
            let raw = Reflect::get(&items, &JsValue::from_str(&key)).map_err(unavailable)?;
            if raw.is_undefined() {
                return Ok(None);
            }
            serde_wasm_bindgen::from_value::<Value>(raw)
                .map(Some)
                .map_err(|e| ConfigError::Unavailable(e.to_string()))
        }
        .boxed_local()
    }

    fn set(&self, key: &str, value: Value) -> LocalBoxFuture<'static, Result<(), ConfigError>> {
        let area = self.area.handle();
        let key = key.to_string();
        async move {
            let items = Object::new();
            let encoded = to_js(&value).map_err(|e| ConfigError::Unavailable(e.to_string()))?;
            Reflect::set(&items, &JsValue::from_str(&key), &encoded).map_err(unavailable)?;
            let promise = area.set(&items).map_err(unavailable)?;
            JsFuture::from(promise).await.map_err(unavailable)?;
            Ok(())
        }
        .boxed_local()
    }

    fn on_change(&self, listener: ChangeListener) -> Subscription {
        let area_name = self.area.name();
        let callback = Closure::wrap(Box::new(move |changes: JsValue, changed_area: JsValue| {
            if changed_area.as_string().as_deref() != Some(area_name) {
                return;
            }
            let Some(changes) = changes.dyn_ref::<Object>() else {
                return;
            };
            for key in Object::keys(changes).iter() {
                let Some(key) = key.as_string() else {
                    continue;
                };
                let new_value = Reflect::get(changes, &JsValue::from_str(&key))
                    .and_then(|change| Reflect::get(&change, &JsValue::from_str("newValue")))
                    .ok()
                    .filter(|value| !value.is_undefined())
                    .and_then(|value| serde_wasm_bindgen::from_value::<Value>(value).ok());
                listener(&key, new_value.as_ref());
            }
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        add_storage_listener(callback.as_ref().unchecked_ref());
        Subscription::new(move || {
            remove_storage_listener(callback.as_ref().unchecked_ref());
        })
    }
}

/// `chrome.runtime.sendMessage` towards the background script.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeChannel;

impl MessageChannel for RuntimeChannel {
    fn notify(&self, message: &BackgroundRequest) -> Result<(), MessagingError> {
        let encoded = to_js(message).map_err(|e| MessagingError::Encode(e.to_string()))?;
        let promise = runtime_send_message(&encoded)
            .map_err(|e| MessagingError::Rejected(js_error(&e)))?;
        // The background never answers these; a rejection only means the
        // service worker was asleep or reloaded.
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                debug!("runtime.sendMessage failed: {}", js_error(&e));
            }
        });
        Ok(())
    }
}

/// `chrome.tabs` messaging from the background script.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeTabs;

impl TabMessenger for ChromeTabs {
    fn send_to_tab(&self, tab_id: i32, message: &ContentRequest) -> Result<(), MessagingError> {
        let encoded = to_js(message).map_err(|e| MessagingError::Encode(e.to_string()))?;
        let promise =
            tabs_send_message(tab_id, &encoded).map_err(|e| MessagingError::Rejected(js_error(&e)))?;
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(reply) => {
                    let pong = Reflect::get(&reply, &JsValue::from_str("pong"))
                        .map(|value| value.is_truthy())
                        .unwrap_or(false);
                    if pong {
                        info!("Content script alive in tab {tab_id}");
                    }
                }
                Err(e) => debug!("Content script not loaded in tab {tab_id}: {}", js_error(&e)),
            }
        });
        Ok(())
    }

    fn broadcast(&self, message: &ContentRequest) {
        let encoded = match to_js(message) {
            Ok(encoded) => encoded,
            Err(e) => {
                debug!("Could not encode broadcast: {e}");
                return;
            }
        };
        let query = match tabs_query(&Object::new()) {
            Ok(query) => query,
            Err(e) => {
                debug!("tabs.query failed: {}", js_error(&e));
                return;
            }
        };
        spawn_local(async move {
            let tabs = match JsFuture::from(query).await {
                Ok(tabs) => js_sys::Array::from(&tabs),
                Err(e) => {
                    debug!("tabs.query failed: {}", js_error(&e));
                    return;
                }
            };
            for tab in tabs.iter() {
                let Ok(tab) = serde_wasm_bindgen::from_value::<Tab>(tab) else {
                    continue;
                };
                let (Some(id), Some(_)) = (tab.id, tab.url) else {
                    continue;
                };
                // Tabs without a content script reject; that is expected.
                if let Ok(promise) = tabs_send_message(id, &encoded) {
                    spawn_local(async move {
                        let _ = JsFuture::from(promise).await;
                    });
                }
            }
        });
    }
}
