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

//! The slice of the page DOM the core reads and writes.
//!
//! A browser host implements these over `web_sys`; the in-memory host in
//! [`crate::testing`] implements them over a plain tree.

use crate::error::DomError;
use crate::notification::Notification;
use crate::selector::Selector;
use crate::subscription::Subscription;
use std::rc::Rc;

/// Rendered size of an element's border box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// Media events a tracked video reports. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    Ended,
}

pub trait PageElement: Clone {
    /// Tag name, lowercase.
    fn tag_name(&self) -> String;
    fn id(&self) -> String;
    /// Raw `class` attribute, empty when absent.
    fn class_name(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    /// Text of all descendants, `textContent`.
    fn text_content(&self) -> String;
    /// Text of the element's own text node children only, without any
    /// descendant elements.
    fn own_text(&self) -> String;
    fn parent(&self) -> Option<Self>;
    fn bounding_size(&self) -> BoxSize;
    /// Computed `display` value, `None` when no style is available.
    fn computed_display(&self) -> Option<String>;

    fn has_class(&self, class: &str) -> bool {
        self.class_name()
            .split_ascii_whitespace()
            .any(|token| token == class)
    }

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, selector: &Selector) -> Option<Self> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if selector.matches(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }
}

/// A `<video>` element. Equality is element identity.
pub trait VideoElement: Clone + PartialEq {
    fn volume(&self) -> Result<f64, DomError>;
    fn set_volume(&self, volume: f64) -> Result<(), DomError>;
    fn muted(&self) -> Result<bool, DomError>;
    fn set_muted(&self, muted: bool) -> Result<(), DomError>;
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    /// Still part of the document tree.
    fn is_connected(&self) -> bool;
    /// Listen for play/pause/ended until the subscription is dropped.
    fn observe_playback(&self, listener: Rc<dyn Fn(PlaybackEvent)>) -> Subscription;

    fn is_playing(&self) -> bool {
        !self.paused() && !self.ended()
    }
}

/// Callback receiving the element nodes added by one batch of mutations.
pub type AddedNodesListener<E> = Rc<dyn Fn(Vec<E>)>;

pub trait PageDocument: 'static {
    type Element: PageElement + 'static;
    type Video: VideoElement + 'static;

    fn hostname(&self) -> String;

    /// Every element in document order, `document.querySelectorAll("*")`.
    fn all_elements(&self) -> Vec<Self::Element>;

    /// Rendered text of `body`, empty without a body.
    fn body_text(&self) -> String;

    /// Every `<video>` currently in the document.
    fn videos(&self) -> Vec<Self::Video>;

    /// `element` itself when it is a `<video>`.
    fn as_video(&self, element: &Self::Element) -> Option<Self::Video>;

    /// `<video>` descendants of `element`, not including itself.
    fn videos_within(&self, element: &Self::Element) -> Vec<Self::Video>;

    /// Report element nodes added anywhere under `body`.
    fn observe_added_nodes(
        &self,
        listener: AddedNodesListener<Self::Element>,
    ) -> Result<Subscription, DomError>;

    /// Append a toast to `body` and return its root element.
    fn show_notification(&self, notification: &Notification) -> Result<Self::Element, DomError>;

    /// Start the toast's fade-out transition.
    fn fade_out(&self, element: &Self::Element);

    /// Detach `element` if it is still attached.
    fn remove(&self, element: &Self::Element);

    fn query_selector(&self, selector: &Selector) -> Option<Self::Element> {
        self.all_elements()
            .into_iter()
            .find(|element| selector.matches(element))
    }

    fn query_selector_all(&self, selector: &Selector) -> Vec<Self::Element> {
        self.all_elements()
            .into_iter()
            .filter(|element| selector.matches(element))
            .collect()
    }
}

/// An element counts as rendered when it has a non-empty box and is not
/// `display: none`. Markup that exists but is hidden never triggers detection.
pub fn is_visible<E: PageElement>(element: &E) -> bool {
    let size = element.bounding_size();
    size.width > 0.0
        && size.height > 0.0
        && element.computed_display().as_deref() != Some("none")
}
