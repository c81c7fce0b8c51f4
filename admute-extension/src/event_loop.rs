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

//! Browser timers and the microtask queue.

use admute_core::{EventLoop, TimerHandle};
use admute_types::MAX_MUTE_DELAY_MS;
use futures::future::LocalBoxFuture;
use gloo_timers::callback::{Interval, Timeout};

/// [`EventLoop`] over `setInterval`/`setTimeout` and `spawn_local`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserEventLoop;

impl EventLoop for BrowserEventLoop {
    fn set_interval(&self, period_ms: u32, callback: Box<dyn Fn()>) -> TimerHandle {
        let interval = Interval::new(period_ms.min(MAX_MUTE_DELAY_MS), move || callback());
        TimerHandle::new(move || drop(interval))
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        // gloo passes the delay on as an i32.
        let timeout = Timeout::new(delay_ms.min(MAX_MUTE_DELAY_MS), move || callback());
        TimerHandle::new(move || drop(timeout))
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
