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
 */

//! Browser tests for the web-sys page host.

#![cfg(target_arch = "wasm32")]

use admute_core::dom::{PageDocument, PageElement, VideoElement};
use admute_core::{Notification, Selector, VideoRegistry};
use admute_extension::{WebDocument, WebElement};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn page() -> WebDocument {
    let page = WebDocument::current().unwrap();
    page.document().body().unwrap().set_inner_html("");
    page
}

fn append(page: &WebDocument, html: &str) -> HtmlElement {
    let document = page.document();
    let holder: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    holder.set_inner_html(html);
    document.body().unwrap().append_child(&holder).unwrap();
    holder
}

#[wasm_bindgen_test]
fn test_query_selector_uses_rendered_css() {
    let page = page();
    append(
        &page,
        r#"<div class="ytp-ad-skip-button-container"><span><button>Skip</button></span></div>"#,
    );
    const NESTED: Selector = Selector::Descendant(
        &Selector::Class("ytp-ad-skip-button-container"),
        &Selector::Tag("button"),
    );
    let button = page.query_selector(&NESTED).unwrap();
    assert_eq!(button.tag_name(), "button");
    assert!(NESTED.matches(&button));
    assert_eq!(button.text_content(), "Skip");
}

#[wasm_bindgen_test]
fn test_hidden_element_has_no_box() {
    let page = page();
    append(
        &page,
        r#"<div style="display:none"><span class="ytp-ad-badge">Ad</span></div>"#,
    );
    let badge = page.query_selector(&Selector::Class("ytp-ad-badge")).unwrap();
    assert_eq!(badge.bounding_size().width, 0.0);
    assert!(!admute_core::dom::is_visible(&badge));
}

#[wasm_bindgen_test]
fn test_own_text_skips_descendant_elements() {
    let page = page();
    let holder = append(
        &page,
        r#"<div>Now playing <button style="width:0">Skip Ad</button></div>"#,
    );
    let element = WebElement(holder.first_element_child().unwrap());
    assert_eq!(element.own_text(), "Now playing ");
    assert!(element.text_content().contains("Skip Ad"));
}

#[wasm_bindgen_test]
fn test_video_mute_round_trip() {
    let page = page();
    append(&page, "<video></video>");
    let video = page.videos().pop().unwrap();
    video.set_volume(0.4).unwrap();
    video.set_muted(true).unwrap();
    assert!(video.muted().unwrap());
    assert!((video.volume().unwrap() - 0.4).abs() < 1e-9);
    assert!(video.set_volume(1.5).is_err());
    assert!(video.is_connected());
}

#[wasm_bindgen_test]
fn test_videos_within_nested_subtree() {
    let page = page();
    let holder = append(&page, "<section><div><p><video></video></p></div></section>");
    let element = WebElement(holder.into());
    assert_eq!(page.videos_within(&element).len(), 1);

    let mut registry = VideoRegistry::new();
    assert_eq!(registry.scan_added(&page, &[element]), 1);
}

#[wasm_bindgen_test]
async fn test_mutation_observer_reports_additions() {
    let page = page();
    let seen = Rc::new(RefCell::new(0usize));
    let counter = seen.clone();
    let subscription = page
        .observe_added_nodes(Rc::new(move |added: Vec<WebElement>| {
            *counter.borrow_mut() += added.len();
        }))
        .unwrap();

    append(&page, "<video></video>");
    // Mutation records are delivered as a microtask.
    wasm_bindgen_futures::JsFuture::from(js_sys::Promise::resolve(&0.into()))
        .await
        .unwrap();
    assert_eq!(*seen.borrow(), 1);
    subscription.unsubscribe();
}

#[wasm_bindgen_test]
fn test_toast_markup() {
    let page = page();
    let toast = page.show_notification(&Notification::muted()).unwrap();
    assert_eq!(toast.attribute("role").as_deref(), Some("status"));
    assert_eq!(toast.class_name(), "");
    assert_eq!(toast.id(), "");
    assert!(toast.text_content().contains("광고 음소거 활성화"));
    page.remove(&toast);
    assert!(page.query_selector(&Selector::Tag("strong")).is_none());
}
