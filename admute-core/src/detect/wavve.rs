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
    Selector::attr_contains("class", "ad-"),
    Selector::attr_contains("class", "Ad"),
    Selector::attr_contains("class", "commercial"),
    Selector::attr_contains("class", "Commercial"),
    Selector::Class("sponsor-container"),
    Selector::Class("player-ad-container"),
    Selector::Class("vod-ad-wrapper"),
    Selector::Class("live-ad-overlay"),
];

const SKIP_BUTTONS: &[Selector] = &[
    Selector::Class("skip-btn"),
    Selector::Class("skip-button"),
    Selector::attr_contains("class", "skip"),
    Selector::tag_attr_contains("button", "class", "ad"),
    Selector::Class("ad-skip"),
    Selector::Class("player-skip-button"),
    Selector::Descendant(&Selector::Class("ad-skip-container"), &Selector::Tag("button")),
];

const AD_TIMERS: &[Selector] = &[
    Selector::Class("ad-timer"),
    Selector::Class("ad-countdown"),
    Selector::attr_contains("class", "countdown"),
    Selector::Class("remaining-time"),
];

/// Wavve: ad containers, skip buttons with ad wording, then countdowns.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavveDetector;

impl AdDetector for WavveDetector {
    fn detect<D: PageDocument>(&self, doc: &D, _videos: &VideoRegistry<D::Video>) -> bool {
        any_first_visible(doc, AD_CONTAINERS)
            || any_first_visible_with_text(doc, SKIP_BUTTONS, SKIP_WORDS)
            || any_first_visible(doc, AD_TIMERS)
    }
}
