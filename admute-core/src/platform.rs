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

//! Event loop primitives the core schedules its work on.
//!
//! Everything runs on one thread: the browser host maps these onto
//! `setInterval`/`setTimeout` and the microtask queue, the manual host in
//! [`crate::testing`] onto a virtual clock.

use crate::subscription::Subscription;
use futures::future::LocalBoxFuture;

/// A scheduled timer. Dropping it (or calling [`TimerHandle::cancel`])
/// stops it.
#[derive(Debug)]
#[must_use = "dropping a timer handle cancels the timer"]
pub struct TimerHandle(Subscription);

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self(Subscription::new(cancel))
    }

    pub fn cancel(self) {
        self.0.unsubscribe();
    }
}

pub trait EventLoop {
    /// Run `callback` every `period_ms`, first run one period from now.
    fn set_interval(&self, period_ms: u32, callback: Box<dyn Fn()>) -> TimerHandle;

    /// Run `callback` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle;

    /// Drive `future` to completion on the loop.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}
