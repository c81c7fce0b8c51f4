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

//! Per-page ad muting: the context object tying registry, detector, state
//! machine and controller to one page's lifetime.

use crate::controller::MuteController;
use crate::detect::{Site, SiteDetector};
use crate::dom::PageDocument;
use crate::messaging::MessageChannel;
use crate::platform::{EventLoop, TimerHandle};
use crate::registry::VideoRegistry;
use crate::state::{AdSignal, AdStateMachine, Transition};
use crate::store::KeyValueStore;
use crate::subscription::Subscription;
use admute_types::{AdMuteSettings, BackgroundRequest};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Detection cadence.
pub const POLL_INTERVAL_MS: u32 = 500;

/// The host services a page runs against.
pub struct PageContext<D: PageDocument> {
    pub doc: Rc<D>,
    pub event_loop: Rc<dyn EventLoop>,
    pub settings_store: Rc<dyn KeyValueStore>,
    pub channel: Rc<dyn MessageChannel>,
}

impl<D: PageDocument> Clone for PageContext<D> {
    fn clone(&self) -> Self {
        Self {
            doc: self.doc.clone(),
            event_loop: self.event_loop.clone(),
            settings_store: self.settings_store.clone(),
            channel: self.channel.clone(),
        }
    }
}

/// Watches one page for ads and mutes its videos while they play.
///
/// Created with fixed settings. A manager for a disabled extension or an
/// unlisted site is inert: it never scans, observes or polls. Dropping the
/// manager tears it down.
pub struct AdMuteManager<D: PageDocument> {
    hostname: String,
    inner: Option<Rc<RefCell<ManagerInner<D>>>>,
}

struct ManagerInner<D: PageDocument> {
    doc: Rc<D>,
    event_loop: Rc<dyn EventLoop>,
    channel: Rc<dyn MessageChannel>,
    settings: AdMuteSettings,
    detector: SiteDetector,
    registry: VideoRegistry<D::Video>,
    state: AdStateMachine,
    controller: MuteController<D>,
    poll_timer: Option<TimerHandle>,
    observer: Option<Subscription>,
    pending_mute: Option<TimerHandle>,
}

impl<D: PageDocument> AdMuteManager<D> {
    pub fn start(ctx: &PageContext<D>, settings: AdMuteSettings) -> Self {
        let hostname = ctx.doc.hostname();

        if !settings.enabled {
            info!("Ad muting is disabled");
            return Self::inert(hostname);
        }
        if !settings.covers_host(&hostname) {
            debug!("{hostname} is not a configured site");
            return Self::inert(hostname);
        }

        let detector = SiteDetector::for_hostname(&hostname);
        info!(
            "Ad muting active on {hostname} ({} detector)",
            detector.site()
        );

        let controller = MuteController::new(
            ctx.doc.clone(),
            ctx.event_loop.clone(),
            settings.show_notifications,
        );
        let inner = Rc::new(RefCell::new(ManagerInner {
            doc: ctx.doc.clone(),
            event_loop: ctx.event_loop.clone(),
            channel: ctx.channel.clone(),
            settings,
            detector,
            registry: VideoRegistry::new(),
            state: AdStateMachine::new(),
            controller,
            poll_timer: None,
            observer: None,
            pending_mute: None,
        }));

        {
            let mut guard = inner.borrow_mut();
            let ManagerInner { doc, registry, .. } = &mut *guard;
            let found = registry.scan_document(&**doc);
            debug!("Initial scan found {found} video(s)");
        }

        let observer = Self::observe_new_videos(&ctx.doc, Rc::downgrade(&inner));
        let weak = Rc::downgrade(&inner);
        let poll_timer = ctx.event_loop.set_interval(
            POLL_INTERVAL_MS,
            Box::new(move || Self::on_tick(&weak)),
        );

        {
            let mut guard = inner.borrow_mut();
            guard.observer = observer;
            guard.poll_timer = Some(poll_timer);
        }

        Self {
            hostname,
            inner: Some(inner),
        }
    }

    fn inert(hostname: String) -> Self {
        Self {
            hostname,
            inner: None,
        }
    }

    fn observe_new_videos(
        doc: &Rc<D>,
        inner: Weak<RefCell<ManagerInner<D>>>,
    ) -> Option<Subscription> {
        let listener = Rc::new(move |added: Vec<D::Element>| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let Ok(mut guard) = inner.try_borrow_mut() else {
                debug!("Manager busy, dropping mutation batch");
                return;
            };
            let ManagerInner { doc, registry, .. } = &mut *guard;
            let registered = registry.scan_added(&**doc, &added);
            if registered > 0 {
                debug!("Registered {registered} new video(s)");
            }
        });
        match doc.observe_added_nodes(listener) {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!("Could not observe DOM mutations: {e}");
                None
            }
        }
    }

    fn on_tick(inner: &Weak<RefCell<ManagerInner<D>>>) {
        let Some(strong) = inner.upgrade() else {
            return;
        };
        let Ok(mut guard) = strong.try_borrow_mut() else {
            debug!("Manager busy, skipping tick");
            return;
        };
        guard.poll(inner);
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn site(&self) -> Option<Site> {
        self.inner
            .as_ref()
            .map(|inner| inner.borrow().detector.site())
    }

    pub fn ad_signal(&self) -> AdSignal {
        self.inner
            .as_ref()
            .map_or(AdSignal::Content, |inner| inner.borrow().state.state())
    }

    pub fn tracked_videos(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.borrow().registry.len())
    }

    /// Remembered volume for `video`, if tracked.
    pub fn original_volume(&self, video: &D::Video) -> Option<f64> {
        self.inner
            .as_ref()
            .and_then(|inner| inner.borrow().registry.original_volume(video))
    }

    pub fn has_pending_mute(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.borrow().pending_mute.is_some())
    }

    pub fn visible_notifications(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.borrow().controller.visible_notifications())
    }

    /// Stop polling, stop observing, unmute everything and forget all
    /// videos, in that order. Remaining timers are cancelled and toasts
    /// removed. Idempotent.
    pub fn teardown(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        let mut guard = inner.borrow_mut();

        if let Some(timer) = guard.poll_timer.take() {
            timer.cancel();
        }
        if let Some(observer) = guard.observer.take() {
            observer.unsubscribe();
        }

        let ManagerInner {
            registry,
            controller,
            pending_mute,
            ..
        } = &mut *guard;
        controller.unmute_all_quietly(registry);
        registry.clear();

        if let Some(timer) = pending_mute.take() {
            timer.cancel();
        }
        controller.dismiss_notifications();

        info!("Ad muting stopped on {}", self.hostname);
    }
}

impl<D: PageDocument> Drop for AdMuteManager<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: PageDocument> ManagerInner<D> {
    /// One detection tick.
    fn poll(&mut self, this: &Weak<RefCell<Self>>) -> Option<Transition> {
        self.registry.prune_detached();
        let detected = self.detector.evaluate(&*self.doc, &self.registry);
        let transition = self.state.observe(detected)?;

        match transition {
            Transition::AdStarted => {
                info!(
                    "Ad detected, muting in {} ms",
                    self.settings.mute_delay
                );
                if let Err(e) = self.channel.notify(&BackgroundRequest::LogAdDetected) {
                    debug!("Ad detection not reported: {e}");
                }
                self.schedule_mute(this.clone());
            }
            Transition::AdEnded => {
                info!("Ad ended, unmuting");
                if let Some(pending) = self.pending_mute.take() {
                    debug!("Cancelled mute that had not fired yet");
                    pending.cancel();
                }
                self.controller.unmute_all(&mut self.registry);
            }
        }
        Some(transition)
    }

    fn schedule_mute(&mut self, this: Weak<RefCell<Self>>) {
        let timer = self.event_loop.set_timeout(
            self.settings.mute_delay,
            Box::new(move || {
                let Some(inner) = this.upgrade() else {
                    return;
                };
                let Ok(mut guard) = inner.try_borrow_mut() else {
                    warn!("Manager busy, delayed mute skipped");
                    return;
                };
                guard.pending_mute = None;
                let ManagerInner {
                    registry,
                    controller,
                    ..
                } = &mut *guard;
                controller.mute_all(registry);
            }),
        );
        self.pending_mute = Some(timer);
    }
}
