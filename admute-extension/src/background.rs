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

//! Background service worker entry point.

use crate::chrome::{
    add_installed_listener, add_message_listener, add_tab_updated_listener, to_js, ChromeStorage,
    ChromeTabs, MessageSender, Tab, TabChangeInfo,
};
use crate::dom::js_error;
use crate::init_logging;
use admute_core::Background;
use admute_types::BackgroundRequest;
use js_sys::Function;
use log::{debug, error, info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

#[wasm_bindgen]
pub fn start_background() {
    console_error_panic_hook::set_once();
    init_logging("background");

    let background = Rc::new(Background::new(
        Rc::new(ChromeStorage::sync()),
        Rc::new(ChromeStorage::local()),
        Rc::new(ChromeTabs),
    ));

    let startup = background.clone();
    spawn_local(async move {
        if let Err(e) = startup.ensure_defaults().await {
            error!("Failed to check stored settings: {e}");
        }
    });

    let installer = background.clone();
    let on_installed = Closure::wrap(Box::new(move |_details: JsValue| {
        let installer = installer.clone();
        spawn_local(async move {
            if let Err(e) = installer.on_installed().await {
                error!("Failed to save default settings: {e}");
            }
        });
    }) as Box<dyn FnMut(JsValue)>);
    add_installed_listener(on_installed.as_ref().unchecked_ref());
    on_installed.forget();

    let tabs = background.clone();
    let on_updated = Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
        let change: TabChangeInfo = serde_wasm_bindgen::from_value(change).unwrap_or_default();
        let tab: Tab = serde_wasm_bindgen::from_value(tab).unwrap_or_default();
        tabs.on_tab_updated(tab_id, change.status.as_deref(), tab.url.as_deref());
    }) as Box<dyn FnMut(i32, JsValue, JsValue)>);
    add_tab_updated_listener(on_updated.as_ref().unchecked_ref());
    on_updated.forget();

    let router = background.clone();
    let on_message = Closure::wrap(Box::new(
        move |request: JsValue, sender: JsValue, send_response: Function| -> JsValue {
            let request: BackgroundRequest = match serde_wasm_bindgen::from_value(request) {
                Ok(request) => request,
                Err(e) => {
                    debug!("Ignoring message: {e}");
                    return JsValue::FALSE;
                }
            };
            let sender: MessageSender = serde_wasm_bindgen::from_value(sender).unwrap_or_default();
            let sender_url = sender.tab.and_then(|tab| tab.url);
            let replies = !matches!(request, BackgroundRequest::LogAdDetected);

            let router = router.clone();
            spawn_local(async move {
                let Some(reply) = router.handle(request, sender_url.as_deref()).await else {
                    return;
                };
                let encoded = match to_js(&reply) {
                    Ok(encoded) => encoded,
                    Err(e) => {
                        warn!("Could not encode reply: {e}");
                        return;
                    }
                };
                if let Err(e) = send_response.call1(&JsValue::NULL, &encoded) {
                    debug!("Sender went away before the reply: {}", js_error(&e));
                }
            });
            // Keep the channel open for the asynchronous reply.
            JsValue::from_bool(replies)
        },
    ) as Box<dyn FnMut(JsValue, JsValue, Function) -> JsValue>);
    add_message_listener(on_message.as_ref().unchecked_ref());
    on_message.forget();

    // Lives as long as the service worker.
    std::mem::forget(background.watch_settings());

    info!("Background script started");
}
