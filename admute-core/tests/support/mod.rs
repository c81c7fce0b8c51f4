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

//! Shared page harness for the integration tests.

#![allow(dead_code)]

use admute_core::testing::{ManualEventLoop, MemNode, MemoryDocument, MemoryStore, RecordingChannel};
use admute_core::PageContext;
use admute_types::{AdMuteSettings, SETTINGS_KEY};
use std::rc::Rc;

pub struct Page {
    pub doc: Rc<MemoryDocument>,
    pub event_loop: Rc<ManualEventLoop>,
    pub store: Rc<MemoryStore>,
    pub channel: Rc<RecordingChannel>,
}

impl Page {
    pub fn new(hostname: &str) -> Self {
        Self::with_parts(hostname, MemoryStore::new(), RecordingChannel::new())
    }

    pub fn with_settings(hostname: &str, settings: &AdMuteSettings) -> Self {
        let store = MemoryStore::new().with(
            SETTINGS_KEY,
            serde_json::to_value(settings).expect("settings serialize"),
        );
        Self::with_parts(hostname, store, RecordingChannel::new())
    }

    pub fn with_parts(hostname: &str, store: MemoryStore, channel: RecordingChannel) -> Self {
        Self {
            doc: Rc::new(MemoryDocument::new(hostname)),
            event_loop: Rc::new(ManualEventLoop::new()),
            store: Rc::new(store),
            channel: Rc::new(channel),
        }
    }

    pub fn ctx(&self) -> PageContext<MemoryDocument> {
        PageContext {
            doc: self.doc.clone(),
            event_loop: self.event_loop.clone(),
            settings_store: self.store.clone(),
            channel: self.channel.clone(),
        }
    }

    /// A YouTube-style player wrapping one video. Returns (player, video).
    pub fn add_player(&self, volume: f64) -> (MemNode, MemNode) {
        let video = MemNode::video().with_volume(volume);
        let player = self.doc.append_to_body(
            MemNode::new("div")
                .with_class("html5-video-player")
                .with_size(1280.0, 720.0)
                .with_child(video.clone()),
        );
        (player, video)
    }

    pub fn add_skip_button(&self) -> MemNode {
        self.doc.append_to_body(
            MemNode::new("button")
                .with_class("ytp-ad-skip-button")
                .with_text("Skip Ad"),
        )
    }
}

pub fn settings_with_delay(mute_delay: u32) -> AdMuteSettings {
    AdMuteSettings {
        mute_delay,
        ..AdMuteSettings::default()
    }
}
