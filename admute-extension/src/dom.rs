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

//! `web_sys` implementation of the core's page traits.

use admute_core::dom::{AddedNodesListener, BoxSize, PageDocument, PageElement, PlaybackEvent, VideoElement};
use admute_core::notification::{Notification, TOAST_STYLE};
use admute_core::{DomError, Selector, Subscription};
use log::debug;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, EventTarget, HtmlCollection, HtmlElement, HtmlVideoElement, MutationObserver,
    MutationObserverInit, MutationRecord, Node, NodeList, Window,
};

pub(crate) fn js_error(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

#[derive(Clone, Debug, PartialEq)]
pub struct WebElement(pub Element);

#[derive(Clone, Debug, PartialEq)]
pub struct WebVideo(pub HtmlVideoElement);

impl PageElement for WebElement {
    fn tag_name(&self) -> String {
        self.0.tag_name().to_ascii_lowercase()
    }

    fn id(&self) -> String {
        self.0.id()
    }

    // `className` is an SVGAnimatedString on SVG elements.
    fn class_name(&self) -> String {
        self.0.get_attribute("class").unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn own_text(&self) -> String {
        let children = self.0.child_nodes();
        (0..children.length())
            .filter_map(|index| children.get(index))
            .filter(|node| node.node_type() == Node::TEXT_NODE)
            .filter_map(|node| node.node_value())
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(WebElement)
    }

    fn bounding_size(&self) -> BoxSize {
        let rect = self.0.get_bounding_client_rect();
        BoxSize {
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn computed_display(&self) -> Option<String> {
        let window = web_sys::window()?;
        let style = window.get_computed_style(&self.0).ok()??;
        style.get_property_value("display").ok()
    }

    fn closest(&self, selector: &Selector) -> Option<Self> {
        self.0
            .closest(&selector.to_string())
            .ok()
            .flatten()
            .map(WebElement)
    }
}

impl WebVideo {
    fn write(&self, property: &str, value: &JsValue) -> Result<(), DomError> {
        js_sys::Reflect::set(&self.0, &JsValue::from_str(property), value)
            .map(|_| ())
            .map_err(|e| DomError::Rejected(format!("{property}: {}", js_error(&e))))
    }
}

impl VideoElement for WebVideo {
    fn volume(&self) -> Result<f64, DomError> {
        Ok(self.0.volume())
    }

    fn set_volume(&self, volume: f64) -> Result<(), DomError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(DomError::Rejected(format!("volume {volume} out of range")));
        }
        self.write("volume", &JsValue::from_f64(volume))
    }

    fn muted(&self) -> Result<bool, DomError> {
        Ok(self.0.muted())
    }

    fn set_muted(&self, muted: bool) -> Result<(), DomError> {
        self.write("muted", &JsValue::from_bool(muted))
    }

    fn paused(&self) -> bool {
        self.0.paused()
    }

    fn ended(&self) -> bool {
        self.0.ended()
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    fn observe_playback(&self, listener: Rc<dyn Fn(PlaybackEvent)>) -> Subscription {
        let target: EventTarget = self.0.clone().into();
        let mut registered = Vec::new();
        for (name, event) in [
            ("play", PlaybackEvent::Play),
            ("pause", PlaybackEvent::Pause),
            ("ended", PlaybackEvent::Ended),
        ] {
            let listener = listener.clone();
            let callback = Closure::wrap(Box::new(move || listener(event)) as Box<dyn FnMut()>);
            match target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            {
                Ok(()) => registered.push((name, callback)),
                Err(e) => debug!("Could not listen for {name}: {}", js_error(&e)),
            }
        }
        Subscription::new(move || {
            for (name, callback) in registered {
                let _ = target
                    .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
            }
        })
    }
}

/// The live page.
pub struct WebDocument {
    window: Window,
    document: Document,
}

impl WebDocument {
    pub fn current() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::Missing("window"))?;
        let document = window.document().ok_or(DomError::Missing("document"))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn body(&self) -> Result<HtmlElement, DomError> {
        self.document.body().ok_or(DomError::Missing("body"))
    }
}

fn node_list_elements(list: &NodeList) -> Vec<WebElement> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(WebElement)
        .collect()
}

fn collection_videos(collection: &HtmlCollection) -> Vec<WebVideo> {
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .filter_map(|element| element.dyn_into::<HtmlVideoElement>().ok())
        .map(WebVideo)
        .collect()
}

impl PageDocument for WebDocument {
    type Element = WebElement;
    type Video = WebVideo;

    fn hostname(&self) -> String {
        self.window.location().hostname().unwrap_or_default()
    }

    fn all_elements(&self) -> Vec<WebElement> {
        self.document
            .query_selector_all("*")
            .map(|list| node_list_elements(&list))
            .unwrap_or_default()
    }

    fn body_text(&self) -> String {
        self.document
            .body()
            .map(|body| body.inner_text())
            .unwrap_or_default()
    }

    fn videos(&self) -> Vec<WebVideo> {
        collection_videos(&self.document.get_elements_by_tag_name("video"))
    }

    fn as_video(&self, element: &WebElement) -> Option<WebVideo> {
        element.0.dyn_ref::<HtmlVideoElement>().cloned().map(WebVideo)
    }

    fn videos_within(&self, element: &WebElement) -> Vec<WebVideo> {
        collection_videos(&element.0.get_elements_by_tag_name("video"))
    }

    fn observe_added_nodes(
        &self,
        listener: AddedNodesListener<WebElement>,
    ) -> Result<Subscription, DomError> {
        let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _: JsValue| {
            let added: Vec<WebElement> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| node_list_elements(&record.added_nodes()))
                .collect();
            if !added.is_empty() {
                listener(added);
            }
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| DomError::Rejected(js_error(&e)))?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(&self.body()?, &options)
            .map_err(|e| DomError::Rejected(js_error(&e)))?;

        Ok(Subscription::new(move || {
            observer.disconnect();
            drop(callback);
        }))
    }

    fn show_notification(&self, notification: &Notification) -> Result<WebElement, DomError> {
        let reject = |e: JsValue| DomError::Rejected(js_error(&e));
        let toast = self.document.create_element("div").map_err(reject)?;
        toast.set_attribute("role", "status").map_err(reject)?;
        toast.set_attribute("style", TOAST_STYLE).map_err(reject)?;

        let title = self.document.create_element("strong").map_err(reject)?;
        title.set_text_content(Some(&notification.title));
        let line_break = self.document.create_element("br").map_err(reject)?;
        let message = self.document.create_text_node(&notification.message);

        toast.append_child(&title).map_err(reject)?;
        toast.append_child(&line_break).map_err(reject)?;
        toast.append_child(&message).map_err(reject)?;
        self.body()?.append_child(&toast).map_err(reject)?;
        Ok(WebElement(toast))
    }

    fn fade_out(&self, element: &WebElement) {
        if let Some(html) = element.0.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("opacity", "0");
        }
    }

    fn remove(&self, element: &WebElement) {
        element.0.remove();
    }

    fn query_selector(&self, selector: &Selector) -> Option<WebElement> {
        self.document
            .query_selector(&selector.to_string())
            .ok()
            .flatten()
            .map(WebElement)
    }

    fn query_selector_all(&self, selector: &Selector) -> Vec<WebElement> {
        self.document
            .query_selector_all(&selector.to_string())
            .map(|list| node_list_elements(&list))
            .unwrap_or_default()
    }
}
