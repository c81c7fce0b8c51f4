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

use super::{contains_any, AdDetector};
use crate::dom::{is_visible, PageDocument, PageElement};
use crate::registry::VideoRegistry;

/// Words whose presence anywhere in the page text makes an ad plausible.
const AD_TEXT: &[&str] = &[
    "광고",
    "advertisement",
    "sponsor",
    "ad",
    "commercial",
    "건너뛰기",
    "skip",
];

const SKIP_TEXT: &[&str] = &["skip", "건너뛰기"];
const AD_MARKUP: &[&str] = &["skip", "ad"];

/// Fallback for every site: ad wording in the page, a video actually
/// playing, and a rendered element whose own text, class or id reads like ad
/// UI. All three must hold.
///
/// Only an element's own text nodes are read, so a hidden skip button never
/// makes its rendered ancestors match.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDetector;

impl AdDetector for GenericDetector {
    fn detect<D: PageDocument>(&self, doc: &D, videos: &VideoRegistry<D::Video>) -> bool {
        if !contains_any(&doc.body_text(), AD_TEXT) {
            return false;
        }
        if !videos.any_playing() {
            return false;
        }
        doc.all_elements()
            .iter()
            .any(|element| looks_like_ad_ui(element) && is_visible(element))
    }
}

fn looks_like_ad_ui<E: PageElement>(element: &E) -> bool {
    contains_any(&element.own_text(), SKIP_TEXT)
        || contains_any(&element.class_name(), AD_MARKUP)
        || contains_any(&element.id(), AD_MARKUP)
}
