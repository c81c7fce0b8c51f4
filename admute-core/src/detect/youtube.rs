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

use super::{any_first_visible, any_match_visible, AdDetector};
use crate::dom::{is_visible, PageDocument, PageElement};
use crate::registry::VideoRegistry;
use crate::selector::Selector;

const AD_BADGES: &[Selector] = &[
    Selector::Class("ytp-ad-badge"),
    Selector::Class("ytp-ad-text"),
    Selector::Descendant(&Selector::Class("video-ads"), &Selector::Class("ad-badge")),
    Selector::Class("ytp-ad-player-overlay-layout"),
];

const SKIP_BUTTONS: &[Selector] = &[
    Selector::Class("ytp-ad-skip-button"),
    Selector::Class("ytp-skip-ad-button"),
    Selector::Descendant(
        &Selector::Class("ytp-ad-skip-button-container"),
        &Selector::Tag("button"),
    ),
    Selector::Class("videoAdUiSkipButton"),
];

const AD_PROGRESS: &[Selector] = &[
    Selector::Class("ytp-ad-progress"),
    Selector::Class("ytp-ad-progress-list"),
];

const AD_VIDEO_SOURCES: &[Selector] = &[
    Selector::tag_attr_contains("video", "src", "googleads"),
    Selector::tag_attr_contains("video", "src", "/ads/"),
];

const PLAYER: Selector = Selector::Class("html5-video-player");
const AD_MODE_CLASS: &str = "ad-mode";

/// YouTube: badges, skip buttons, the ad progress bar, the player's
/// `ad-mode` flag and finally ad-served video sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct YouTubeDetector;

impl AdDetector for YouTubeDetector {
    fn detect<D: PageDocument>(&self, doc: &D, _videos: &VideoRegistry<D::Video>) -> bool {
        any_first_visible(doc, AD_BADGES)
            || any_first_visible(doc, SKIP_BUTTONS)
            || any_first_visible(doc, AD_PROGRESS)
            || player_in_ad_mode(doc)
            || any_match_visible(doc, AD_VIDEO_SOURCES)
    }
}

/// The player toggles `ad-mode` on its root while an ad plays. The flag is
/// only trusted while the player itself is rendered.
fn player_in_ad_mode<D: PageDocument>(doc: &D) -> bool {
    let Some(video) = doc.query_selector(&Selector::Tag("video")) else {
        return false;
    };
    video
        .closest(&PLAYER)
        .is_some_and(|player| player.has_class(AD_MODE_CLASS) && is_visible(&player))
}
