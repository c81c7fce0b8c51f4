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

use super::{any_match_visible, AdDetector};
use crate::dom::PageDocument;
use crate::registry::VideoRegistry;
use crate::selector::Selector;

const AD_INDICATORS: &[Selector] = &[
    Selector::attr_contains("data-uia", "ad"),
    Selector::attr_contains("class", "ad-"),
];

/// Netflix only serves ads on some plans and regions; any rendered element
/// tagged as ad UI counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetflixDetector;

impl AdDetector for NetflixDetector {
    fn detect<D: PageDocument>(&self, doc: &D, _videos: &VideoRegistry<D::Video>) -> bool {
        any_match_visible(doc, AD_INDICATORS)
    }
}
