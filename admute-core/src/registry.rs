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

//! The set of `<video>` elements the extension manages.

use crate::dom::{PageDocument, PlaybackEvent, VideoElement};
use crate::subscription::Subscription;
use log::{debug, warn};
use std::rc::Rc;

/// A video under management and the volume to restore after an ad.
pub struct TrackedVideo<V: VideoElement> {
    element: V,
    original_volume: Option<f64>,
    _playback: Subscription,
}

impl<V: VideoElement> TrackedVideo<V> {
    pub fn element(&self) -> &V {
        &self.element
    }

    pub fn original_volume(&self) -> Option<f64> {
        self.original_volume
    }

    pub(crate) fn remember_volume(&mut self, volume: f64) {
        self.original_volume = Some(volume);
    }
}

/// Tracked videos, unique by element identity.
///
/// Entries are released when their element leaves the document
/// ([`VideoRegistry::prune_detached`]) or when the registry is cleared, so
/// the registry never keeps a removed video alive.
pub struct VideoRegistry<V: VideoElement> {
    videos: Vec<TrackedVideo<V>>,
}

impl<V: VideoElement + 'static> VideoRegistry<V> {
    pub fn new() -> Self {
        Self { videos: Vec::new() }
    }

    /// Start tracking `video` unless it already is. Returns whether it was
    /// added.
    pub fn register_if_new(&mut self, video: V) -> bool {
        if self.contains(&video) {
            return false;
        }

        let original_volume = match video.volume() {
            Ok(volume) => Some(volume),
            Err(e) => {
                warn!("Could not read volume of new video: {e}");
                None
            }
        };
        let playback = video.observe_playback(Rc::new(|event| match event {
            PlaybackEvent::Play => debug!("Tracked video started playing"),
            PlaybackEvent::Pause => debug!("Tracked video paused"),
            PlaybackEvent::Ended => debug!("Tracked video ended"),
        }));

        debug!("Tracking video (volume {original_volume:?})");
        self.videos.push(TrackedVideo {
            element: video,
            original_volume,
            _playback: playback,
        });
        true
    }

    /// Register every video in the document. Used once at startup.
    pub fn scan_document<D>(&mut self, doc: &D) -> usize
    where
        D: PageDocument<Video = V>,
    {
        doc.videos()
            .into_iter()
            .filter(|video| self.register_if_new(video.clone()))
            .count()
    }

    /// Register videos among freshly added nodes: each node itself and all
    /// of its video descendants.
    pub fn scan_added<D>(&mut self, doc: &D, added: &[D::Element]) -> usize
    where
        D: PageDocument<Video = V>,
    {
        let mut registered = 0;
        for node in added {
            if let Some(video) = doc.as_video(node) {
                if self.register_if_new(video) {
                    registered += 1;
                }
            }
            for video in doc.videos_within(node) {
                if self.register_if_new(video) {
                    registered += 1;
                }
            }
        }
        registered
    }

    /// Drop entries whose element left the document. Returns how many.
    pub fn prune_detached(&mut self) -> usize {
        let before = self.videos.len();
        self.videos.retain(|tracked| tracked.element.is_connected());
        let removed = before - self.videos.len();
        if removed > 0 {
            debug!("Released {removed} detached video(s)");
        }
        removed
    }

    pub fn contains(&self, video: &V) -> bool {
        self.videos.iter().any(|tracked| tracked.element == *video)
    }

    pub fn original_volume(&self, video: &V) -> Option<f64> {
        self.videos
            .iter()
            .find(|tracked| tracked.element == *video)
            .and_then(|tracked| tracked.original_volume)
    }

    pub fn any_playing(&self) -> bool {
        self.videos
            .iter()
            .any(|tracked| tracked.element.is_connected() && tracked.element.is_playing())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedVideo<V>> {
        self.videos.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedVideo<V>> {
        self.videos.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Forget every video and detach their playback listeners.
    pub fn clear(&mut self) {
        self.videos.clear();
    }
}

impl<V: VideoElement + 'static> Default for VideoRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
