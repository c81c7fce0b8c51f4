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

//! Ad detection strategies.
//!
//! The page's site is resolved once into a [`Site`]. Each tick the matching
//! site strategy runs first; when it finds nothing the generic strategy gets
//! a chance, since every site occasionally serves ads in markup the
//! site-specific selectors do not know about.

mod generic;
mod netflix;
mod tving;
mod wavve;
mod youtube;

pub use generic::GenericDetector;
pub use netflix::NetflixDetector;
pub use tving::TvingDetector;
pub use wavve::WavveDetector;
pub use youtube::YouTubeDetector;

use crate::dom::{is_visible, PageDocument, PageElement};
use crate::registry::VideoRegistry;
use crate::selector::Selector;
use std::fmt;

/// Answers "is an ad on screen right now?" for one kind of page.
///
/// Implementations only read the document.
pub trait AdDetector {
    fn detect<D: PageDocument>(&self, doc: &D, videos: &VideoRegistry<D::Video>) -> bool;
}

/// The streaming sites with dedicated heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Tving,
    YouTube,
    Netflix,
    Wavve,
    /// Anything else; only the generic strategy applies.
    Other,
}

impl Site {
    pub fn from_hostname(hostname: &str) -> Self {
        if hostname.contains("tving.com") {
            Site::Tving
        } else if hostname.contains("youtube.com") {
            Site::YouTube
        } else if hostname.contains("netflix.com") {
            Site::Netflix
        } else if hostname.contains("wavve.com") {
            Site::Wavve
        } else {
            Site::Other
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Tving => write!(f, "tving"),
            Site::YouTube => write!(f, "youtube"),
            Site::Netflix => write!(f, "netflix"),
            Site::Wavve => write!(f, "wavve"),
            Site::Other => write!(f, "generic"),
        }
    }
}

/// Site strategy plus generic fallback, fixed for the lifetime of a page.
#[derive(Debug, Clone, Copy)]
pub struct SiteDetector {
    site: Site,
}

impl SiteDetector {
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    pub fn for_hostname(hostname: &str) -> Self {
        Self::new(Site::from_hostname(hostname))
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn evaluate<D: PageDocument>(&self, doc: &D, videos: &VideoRegistry<D::Video>) -> bool {
        let site_specific = match self.site {
            Site::Tving => TvingDetector.detect(doc, videos),
            Site::YouTube => YouTubeDetector.detect(doc, videos),
            Site::Netflix => NetflixDetector.detect(doc, videos),
            Site::Wavve => WavveDetector.detect(doc, videos),
            Site::Other => false,
        };
        site_specific || GenericDetector.detect(doc, videos)
    }
}

/// Words that confirm a skip button really belongs to an ad.
pub(crate) const SKIP_WORDS: &[&str] = &["skip", "건너뛰기", "광고"];

/// First element matching `selector`, if it is rendered.
///
/// Like `querySelector`, only the first match is considered.
pub(crate) fn first_visible<D: PageDocument>(doc: &D, selector: &Selector) -> Option<D::Element> {
    doc.query_selector(selector)
        .filter(|element| is_visible(element))
}

/// Any selector whose first match is rendered.
pub(crate) fn any_first_visible<D: PageDocument>(doc: &D, selectors: &[Selector]) -> bool {
    selectors
        .iter()
        .any(|selector| first_visible(doc, selector).is_some())
}

/// Any selector whose first match is rendered and whose lowercased text
/// contains one of `words`.
pub(crate) fn any_first_visible_with_text<D: PageDocument>(
    doc: &D,
    selectors: &[Selector],
    words: &[&str],
) -> bool {
    selectors.iter().any(|selector| {
        first_visible(doc, selector).is_some_and(|element| contains_any(&element.text_content(), words))
    })
}

/// Any element matching any of `selectors` that is rendered.
pub(crate) fn any_match_visible<D: PageDocument>(doc: &D, selectors: &[Selector]) -> bool {
    selectors.iter().any(|selector| {
        doc.query_selector_all(selector)
            .iter()
            .any(|element| is_visible(element))
    })
}

pub(crate) fn contains_any(text: &str, words: &[&str]) -> bool {
    let text = text.to_lowercase();
    words.iter().any(|word| text.contains(word))
}
