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

//! Applies mute and unmute to every tracked video.

use crate::dom::{PageDocument, VideoElement};
use crate::error::DomError;
use crate::notification::{Notification, ToastTray};
use crate::platform::EventLoop;
use crate::registry::{TrackedVideo, VideoRegistry};
use log::{debug, info, warn};
use std::rc::Rc;

/// Result of one mute or unmute pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Videos whose state changed.
    pub changed: usize,
    /// Videos that could not be read or written. Skipped, not retried.
    pub failed: usize,
}

pub struct MuteController<D: PageDocument> {
    show_notifications: bool,
    toasts: ToastTray<D>,
}

impl<D: PageDocument> MuteController<D> {
    pub fn new(doc: Rc<D>, event_loop: Rc<dyn EventLoop>, show_notifications: bool) -> Self {
        Self {
            show_notifications,
            toasts: ToastTray::new(doc, event_loop),
        }
    }

    /// Mute every attached, unmuted video, remembering its current volume
    /// first. Shows one toast when anything was muted.
    pub fn mute_all(&self, registry: &mut VideoRegistry<D::Video>) -> BatchOutcome {
        let outcome = apply(registry, mute_one);
        if outcome.changed > 0 {
            info!("Muted {} video(s)", outcome.changed);
            self.notify(Notification::muted());
        }
        outcome
    }

    /// Unmute every attached, muted video and restore the remembered volume.
    /// Shows one toast when anything was unmuted.
    pub fn unmute_all(&self, registry: &mut VideoRegistry<D::Video>) -> BatchOutcome {
        let outcome = self.unmute_all_quietly(registry);
        if outcome.changed > 0 {
            self.notify(Notification::unmuted());
        }
        outcome
    }

    /// [`MuteController::unmute_all`] without the toast, used on teardown.
    pub fn unmute_all_quietly(&self, registry: &mut VideoRegistry<D::Video>) -> BatchOutcome {
        let outcome = apply(registry, unmute_one);
        if outcome.changed > 0 {
            info!("Unmuted {} video(s)", outcome.changed);
        }
        outcome
    }

    /// Take down any toast still on screen.
    pub fn dismiss_notifications(&self) {
        self.toasts.dismiss_all();
    }

    pub fn visible_notifications(&self) -> usize {
        self.toasts.len()
    }

    fn notify(&self, notification: Notification) {
        if self.show_notifications {
            self.toasts.show(&notification);
        }
    }
}

/// Run `op` over every attached video. A failure on one video is logged and
/// the pass continues with the next.
fn apply<V, F>(registry: &mut VideoRegistry<V>, op: F) -> BatchOutcome
where
    V: VideoElement + 'static,
    F: Fn(&mut TrackedVideo<V>) -> Result<bool, DomError>,
{
    let mut outcome = BatchOutcome::default();
    for tracked in registry.iter_mut() {
        if !tracked.element().is_connected() {
            continue;
        }
        match op(tracked) {
            Ok(true) => outcome.changed += 1,
            Ok(false) => {}
            Err(e) => {
                warn!("Skipping video: {e}");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

fn mute_one<V: VideoElement>(tracked: &mut TrackedVideo<V>) -> Result<bool, DomError> {
    if tracked.element().muted()? {
        return Ok(false);
    }
    let volume = tracked.element().volume()?;
    tracked.remember_volume(volume);
    tracked.element().set_muted(true)?;
    debug!("Muted video, remembered volume {volume}");
    Ok(true)
}

fn unmute_one<V: VideoElement>(tracked: &mut TrackedVideo<V>) -> Result<bool, DomError> {
    if !tracked.element().muted()? {
        return Ok(false);
    }
    tracked.element().set_muted(false)?;
    match tracked.original_volume() {
        Some(volume) => {
            tracked.element().set_volume(volume)?;
            debug!("Unmuted video, restored volume {volume}");
        }
        None => debug!("Unmuted video, volume left as is"),
    }
    Ok(true)
}
