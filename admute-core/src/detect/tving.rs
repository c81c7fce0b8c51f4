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

use super::{any_first_visible, any_first_visible_with_text, AdDetector, SKIP_WORDS};
use crate::dom::PageDocument;
use crate::registry::VideoRegistry;
use crate::selector::Selector;

const AD_CONTAINERS: &[Selector] = &[
    Selector::Class("ad-container"),
    Selector::Class("advertisement"),
    Selector::Class("ad-wrapper"),
    Selector::attr_contains("class", "ad-"),
    Selector::attr_contains("id", "ad-"),
    Selector::Class("commercial"),
    Selector::Class("sponsor"),
    Selector::attr_contains("class", "Advertisement"),
    Selector::attr_contains("class", "commercial"),
    Selector::Class("vod-ad-container"),
    Selector::Class("live-ad-container"),
];

const SKIP_BUTTONS: &[Selector] = &[
    Selector::attr_contains("class", "skip"),
    Selector::attr_contains("class", "Skip"),
    Selector::attr_contains("id", "skip"),
    Selector::tag_attr_contains("button", "class", "ad"),
    Selector::Class("btn-skip"),
    Selector::Class("skip-ad"),
    Selector::Class("ad-skip-button"),
    Selector::Class("skip-button"),
];

const AD_LABELS: &[Selector] = &[
    Selector::Class("ad-text"),
    Selector::Class("ad-label"),
    Selector::Class("advertisement-text"),
    Selector::attr_contains("class", "ad-info"),
];

const AD_LABEL_WORDS: &[&str] = &["광고", "ad", "advertisement"];

/// TVING: ad containers, then skip buttons with ad wording, then ad labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TvingDetector;

impl AdDetector for TvingDetector {
    fn detect<D: PageDocument>(&self, doc: &D, _videos: &VideoRegistry<D::Video>) -> bool {
        any_first_visible(doc, AD_CONTAINERS)
            || any_first_visible_with_text(doc, SKIP_BUTTONS, SKIP_WORDS)
            || any_first_visible_with_text(doc, AD_LABELS, AD_LABEL_WORDS)
    }
}
