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

use crate::dom::{AddedNodesListener, BoxSize, PageDocument, PageElement, PlaybackEvent, VideoElement};
use crate::error::DomError;
use crate::notification::{Notification, TOAST_STYLE};
use crate::subscription::Subscription;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

type PlaybackListener = Rc<dyn Fn(PlaybackEvent)>;

struct MediaState {
    volume: f64,
    muted: bool,
    paused: bool,
    ended: bool,
    reject_io: bool,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            paused: true,
            ended: false,
            reject_io: false,
        }
    }
}

struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    size: BoxSize,
    display: String,
    opacity: Option<String>,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<MemNode>,
    is_root: bool,
    media: MediaState,
    next_listener: u64,
    playback_listeners: Vec<(u64, PlaybackListener)>,
}

/// A node of the in-memory DOM. Clones share the node; equality is identity.
#[derive(Clone)]
pub struct MemNode(Rc<RefCell<NodeData>>);

impl MemNode {
    /// A visible 100x20 element with no attributes.
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            size: BoxSize {
                width: 100.0,
                height: 20.0,
            },
            display: "block".to_string(),
            opacity: None,
            parent: Weak::new(),
            children: Vec::new(),
            is_root: false,
            media: MediaState::default(),
            next_listener: 0,
            playback_listeners: Vec::new(),
        })))
    }

    /// A paused 640x360 `<video>` at full volume.
    pub fn video() -> Self {
        Self::new("video").with_size(640.0, 360.0)
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_size(self, width: f64, height: f64) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn with_volume(self, volume: f64) -> Self {
        self.0.borrow_mut().media.volume = volume;
        self
    }

    /// Attach `child` while building a detached subtree. No mutation is
    /// reported; use [`MemoryDocument::append`] for nodes added to a live
    /// page.
    pub fn with_child(self, child: MemNode) -> Self {
        link(&self, &child);
        self
    }

    pub fn add_class(&self, class: &str) {
        let mut data = self.0.borrow_mut();
        let entry = data.attributes.entry("class".to_string()).or_default();
        if !entry.split_ascii_whitespace().any(|token| token == class) {
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(class);
        }
    }

    pub fn remove_class(&self, class: &str) {
        let mut data = self.0.borrow_mut();
        if let Some(entry) = data.attributes.get_mut("class") {
            *entry = entry
                .split_ascii_whitespace()
                .filter(|token| *token != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_text(&self, text: &str) {
        self.0.borrow_mut().text = text.to_string();
    }

    pub fn set_size(&self, width: f64, height: f64) {
        self.0.borrow_mut().size = BoxSize { width, height };
    }

    pub fn set_display(&self, display: &str) {
        self.0.borrow_mut().display = display.to_string();
    }

    pub fn hide(&self) {
        self.set_display("none");
    }

    pub fn show(&self) {
        self.set_display("block");
    }

    pub fn opacity(&self) -> Option<String> {
        self.0.borrow().opacity.clone()
    }

    pub fn children(&self) -> Vec<MemNode> {
        self.0.borrow().children.clone()
    }

    /// Make every media property read and write fail, as for an element
    /// the browser refuses to touch.
    pub fn reject_media_io(&self, reject: bool) {
        self.0.borrow_mut().media.reject_io = reject;
    }

    /// Change the volume the way the user would, bypassing the trait.
    pub fn user_set_volume(&self, volume: f64) {
        self.0.borrow_mut().media.volume = volume;
    }

    pub fn play(&self) {
        {
            let mut data = self.0.borrow_mut();
            data.media.paused = false;
            data.media.ended = false;
        }
        self.dispatch(PlaybackEvent::Play);
    }

    pub fn pause(&self) {
        self.0.borrow_mut().media.paused = true;
        self.dispatch(PlaybackEvent::Pause);
    }

    pub fn end(&self) {
        {
            let mut data = self.0.borrow_mut();
            data.media.paused = true;
            data.media.ended = true;
        }
        self.dispatch(PlaybackEvent::Ended);
    }

    pub fn playback_listener_count(&self) -> usize {
        self.0.borrow().playback_listeners.len()
    }

    fn dispatch(&self, event: PlaybackEvent) {
        let listeners: Vec<_> = self
            .0
            .borrow()
            .playback_listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    fn descendants(&self, out: &mut Vec<MemNode>) {
        for child in self.children() {
            out.push(child.clone());
            child.descendants(out);
        }
    }

    fn hidden_by_ancestor(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.0.borrow().display == "none" {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn media_read<T>(&self, read: impl FnOnce(&MediaState) -> T) -> Result<T, DomError> {
        let data = self.0.borrow();
        if data.media.reject_io {
            return Err(DomError::Rejected("media access denied".to_string()));
        }
        Ok(read(&data.media))
    }

    fn media_write(&self, write: impl FnOnce(&mut MediaState)) -> Result<(), DomError> {
        let mut data = self.0.borrow_mut();
        if data.media.reject_io {
            return Err(DomError::Rejected("media access denied".to_string()));
        }
        write(&mut data.media);
        Ok(())
    }
}

fn link(parent: &MemNode, child: &MemNode) {
    detach(child);
    child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
    parent.0.borrow_mut().children.push(child.clone());
}

fn detach(node: &MemNode) {
    let Some(parent) = node.parent() else {
        return;
    };
    parent
        .0
        .borrow_mut()
        .children
        .retain(|child| child != node);
    node.0.borrow_mut().parent = Weak::new();
}

impl PartialEq for MemNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemNode {}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("MemNode")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .finish()
    }
}

impl PageElement for MemNode {
    fn tag_name(&self) -> String {
        self.0.borrow().tag.clone()
    }

    fn id(&self) -> String {
        self.attribute("id").unwrap_or_default()
    }

    fn class_name(&self) -> String {
        self.attribute("class").unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn text_content(&self) -> String {
        let mut text = self.0.borrow().text.clone();
        for child in self.children() {
            text.push_str(&child.text_content());
        }
        text
    }

    fn own_text(&self) -> String {
        self.0.borrow().text.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(MemNode)
    }

    fn bounding_size(&self) -> BoxSize {
        if self.hidden_by_ancestor() {
            return BoxSize::default();
        }
        self.0.borrow().size
    }

    fn computed_display(&self) -> Option<String> {
        Some(self.0.borrow().display.clone())
    }
}

impl VideoElement for MemNode {
    fn volume(&self) -> Result<f64, DomError> {
        self.media_read(|media| media.volume)
    }

    fn set_volume(&self, volume: f64) -> Result<(), DomError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(DomError::Rejected(format!("volume {volume} out of range")));
        }
        self.media_write(|media| media.volume = volume)
    }

    fn muted(&self) -> Result<bool, DomError> {
        self.media_read(|media| media.muted)
    }

    fn set_muted(&self, muted: bool) -> Result<(), DomError> {
        self.media_write(|media| media.muted = muted)
    }

    fn paused(&self) -> bool {
        self.0.borrow().media.paused
    }

    fn ended(&self) -> bool {
        self.0.borrow().media.ended
    }

    fn is_connected(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.0.borrow().is_root {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn observe_playback(&self, listener: Rc<dyn Fn(PlaybackEvent)>) -> Subscription {
        let id = {
            let mut data = self.0.borrow_mut();
            let id = data.next_listener;
            data.next_listener += 1;
            data.playback_listeners.push((id, listener));
            id
        };
        let node = Rc::downgrade(&self.0);
        Subscription::new(move || {
            if let Some(node) = node.upgrade() {
                node.borrow_mut()
                    .playback_listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    listeners: Vec<(u64, AddedNodesListener<MemNode>)>,
}

/// An in-memory page.
///
/// Like a real `MutationObserver`, added nodes are queued and only
/// delivered when [`MemoryDocument::flush_mutations`] runs, never from
/// inside the call that added them.
pub struct MemoryDocument {
    hostname: String,
    body: MemNode,
    observers: Rc<RefCell<Observers>>,
    pending: RefCell<Vec<MemNode>>,
    notifications_shown: Cell<usize>,
}

impl MemoryDocument {
    pub fn new(hostname: &str) -> Self {
        let body = MemNode::new("body").with_size(1280.0, 720.0);
        body.0.borrow_mut().is_root = true;
        Self {
            hostname: hostname.to_string(),
            body,
            observers: Rc::new(RefCell::new(Observers::default())),
            pending: RefCell::new(Vec::new()),
            notifications_shown: Cell::new(0),
        }
    }

    pub fn body(&self) -> MemNode {
        self.body.clone()
    }

    /// Insert `node` (and its subtree) under `parent`, queueing a mutation
    /// record when `parent` is in the document.
    pub fn append(&self, parent: &MemNode, node: MemNode) -> MemNode {
        link(parent, &node);
        if parent.is_connected() {
            self.pending.borrow_mut().push(node.clone());
        }
        node
    }

    pub fn append_to_body(&self, node: MemNode) -> MemNode {
        let body = self.body.clone();
        self.append(&body, node)
    }

    pub fn detach(&self, node: &MemNode) {
        detach(node);
    }

    /// Deliver queued additions to every observer, as one batch.
    pub fn flush_mutations(&self) {
        let added: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        if added.is_empty() {
            return;
        }
        let listeners: Vec<_> = self
            .observers
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(added.clone());
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().listeners.len()
    }

    /// Toasts ever shown on this page.
    pub fn notifications_shown(&self) -> usize {
        self.notifications_shown.get()
    }

    /// Toast nodes currently attached to the body.
    pub fn live_notifications(&self) -> Vec<MemNode> {
        self.body
            .children()
            .into_iter()
            .filter(|node| node.attribute("role").as_deref() == Some("status"))
            .collect()
    }
}

impl PageDocument for MemoryDocument {
    type Element = MemNode;
    type Video = MemNode;

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn all_elements(&self) -> Vec<MemNode> {
        let mut all = vec![self.body.clone()];
        self.body.descendants(&mut all);
        all
    }

    fn body_text(&self) -> String {
        self.body.text_content()
    }

    fn videos(&self) -> Vec<MemNode> {
        self.all_elements()
            .into_iter()
            .filter(|node| node.tag_name() == "video")
            .collect()
    }

    fn as_video(&self, element: &MemNode) -> Option<MemNode> {
        (element.tag_name() == "video").then(|| element.clone())
    }

    fn videos_within(&self, element: &MemNode) -> Vec<MemNode> {
        let mut descendants = Vec::new();
        element.descendants(&mut descendants);
        descendants
            .into_iter()
            .filter(|node| node.tag_name() == "video")
            .collect()
    }

    fn observe_added_nodes(
        &self,
        listener: AddedNodesListener<MemNode>,
    ) -> Result<Subscription, DomError> {
        let id = {
            let mut observers = self.observers.borrow_mut();
            let id = observers.next_id;
            observers.next_id += 1;
            observers.listeners.push((id, listener));
            id
        };
        let observers = Rc::downgrade(&self.observers);
        Ok(Subscription::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        }))
    }

    fn show_notification(&self, notification: &Notification) -> Result<MemNode, DomError> {
        let toast = MemNode::new("div")
            .with_attr("role", "status")
            .with_attr("style", TOAST_STYLE)
            .with_size(300.0, 48.0)
            .with_child(MemNode::new("strong").with_text(&notification.title))
            .with_child(MemNode::new("br").with_size(0.0, 0.0))
            .with_child(MemNode::new("span").with_text(&notification.message));
        self.notifications_shown.set(self.notifications_shown.get() + 1);
        Ok(self.append_to_body(toast))
    }

    fn fade_out(&self, element: &MemNode) {
        element.0.borrow_mut().opacity = Some("0".to_string());
    }

    fn remove(&self, element: &MemNode) {
        detach(element);
    }
}
