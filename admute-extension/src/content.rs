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

//! Content script entry point.

use crate::chrome::{add_message_listener, to_js, ChromeStorage, RuntimeChannel};
use crate::dom::{js_error, WebDocument};
use crate::event_loop::BrowserEventLoop;
use crate::init_logging;
use admute_core::{ContentScript, PageContext};
use admute_types::ContentRequest;
use anyhow::{anyhow, Context};
use js_sys::{Function, Reflect};
use log::{debug, info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Called by the content script loader on every matching page.
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging("content");
    install().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

fn install() -> anyhow::Result<()> {
    let window = web_sys::window().context("no window")?;
    let page = WebDocument::current().context("no document to watch")?;
    let document = page.document().clone();

    let script = Rc::new(ContentScript::new(PageContext {
        doc: Rc::new(page),
        event_loop: Rc::new(BrowserEventLoop),
        settings_store: Rc::new(ChromeStorage::sync()),
        channel: Rc::new(RuntimeChannel),
    }));

    let still_loading = Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "loading");
    if still_loading {
        let on_ready = script.clone();
        let callback = Closure::wrap(Box::new(move || on_ready.start()) as Box<dyn FnMut()>);
        document
            .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("DOMContentLoaded listener: {}", js_error(&e)))?;
        callback.forget();
    } else {
        script.start();
    }

    let on_unload = script.clone();
    let callback = Closure::wrap(Box::new(move || on_unload.shutdown()) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("beforeunload", callback.as_ref().unchecked_ref())
        .map_err(|e| anyhow!("beforeunload listener: {}", js_error(&e)))?;
    callback.forget();

    let on_message = script;
    let callback = Closure::wrap(Box::new(
        move |request: JsValue, _sender: JsValue, send_response: Function| -> JsValue {
            let request: ContentRequest = match serde_wasm_bindgen::from_value(request) {
                Ok(request) => request,
                Err(e) => {
                    debug!("Ignoring message: {e}");
                    return JsValue::FALSE;
                }
            };
            let reply = on_message.handle(&request);
            match to_js(&reply) {
                Ok(reply) => {
                    if let Err(e) = send_response.call1(&JsValue::NULL, &reply) {
                        warn!("Could not answer {request:?}: {}", js_error(&e));
                    }
                }
                Err(e) => warn!("Could not encode reply to {request:?}: {e}"),
            }
            JsValue::FALSE
        },
    ) as Box<dyn FnMut(JsValue, JsValue, Function) -> JsValue>);
    add_message_listener(callback.as_ref().unchecked_ref());
    callback.forget();

    info!("Content script loaded");
    Ok(())
}
