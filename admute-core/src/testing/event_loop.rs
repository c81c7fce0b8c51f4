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

use crate::platform::{EventLoop, TimerHandle};
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use log::warn;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// A single-threaded event loop on a virtual clock.
///
/// Time only moves in [`ManualEventLoop::advance`]. Timers due at the same
/// instant fire in the order they were scheduled, and spawned futures are
/// run until they stall after every timer callback.
pub struct ManualEventLoop {
    clock: Rc<RefCell<Clock>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

#[derive(Default)]
struct Clock {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<u64, Timer>,
}

struct Timer {
    due_ms: u64,
    kind: TimerKind,
}

enum TimerKind {
    Interval {
        period_ms: u64,
        callback: Rc<dyn Fn()>,
    },
    Timeout(Box<dyn FnOnce()>),
}

enum Fire {
    Repeat(Rc<dyn Fn()>),
    Once(Box<dyn FnOnce()>),
}

impl ManualEventLoop {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            clock: Rc::new(RefCell::new(Clock::default())),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Timers scheduled and not yet fired or cancelled. Intervals count
    /// until cancelled.
    pub fn pending_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Poll spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Move the clock forward by `ms`, firing every timer that falls due on
    /// the way.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms() + ms;
        self.run_until_stalled();
        loop {
            let fire = {
                let mut clock = self.clock.borrow_mut();
                let next = clock
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by_key(|(id, timer)| (timer.due_ms, **id))
                    .map(|(id, timer)| (*id, timer.due_ms));
                let Some((id, due_ms)) = next else {
                    break;
                };
                clock.now_ms = due_ms;
                match clock.timers.remove(&id) {
                    Some(Timer {
                        kind: TimerKind::Interval {
                            period_ms,
                            callback,
                        },
                        ..
                    }) => {
                        clock.timers.insert(
                            id,
                            Timer {
                                due_ms: due_ms + period_ms,
                                kind: TimerKind::Interval {
                                    period_ms,
                                    callback: callback.clone(),
                                },
                            },
                        );
                        Fire::Repeat(callback)
                    }
                    Some(Timer {
                        kind: TimerKind::Timeout(callback),
                        ..
                    }) => Fire::Once(callback),
                    None => continue,
                }
            };
            match fire {
                Fire::Repeat(callback) => callback(),
                Fire::Once(callback) => callback(),
            }
            self.run_until_stalled();
        }
        self.clock.borrow_mut().now_ms = target;
    }

    fn schedule(&self, delay_ms: u64, kind: TimerKind) -> TimerHandle {
        let id = {
            let mut clock = self.clock.borrow_mut();
            let id = clock.next_id;
            clock.next_id += 1;
            let due_ms = clock.now_ms + delay_ms;
            clock.timers.insert(id, Timer { due_ms, kind });
            id
        };
        let clock: Weak<RefCell<Clock>> = Rc::downgrade(&self.clock);
        TimerHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                clock.borrow_mut().timers.remove(&id);
            }
        })
    }
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop for ManualEventLoop {
    fn set_interval(&self, period_ms: u32, callback: Box<dyn Fn()>) -> TimerHandle {
        let period_ms = u64::from(period_ms.max(1));
        self.schedule(
            period_ms,
            TimerKind::Interval {
                period_ms,
                callback: Rc::from(callback),
            },
        )
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        self.schedule(u64::from(delay_ms), TimerKind::Timeout(callback))
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            warn!("Failed to spawn task: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn interval_fires_each_period() {
        let event_loop = ManualEventLoop::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let _timer = event_loop.set_interval(500, Box::new(move || counter.set(counter.get() + 1)));

        event_loop.advance(499);
        assert_eq!(ticks.get(), 0);
        event_loop.advance(1);
        assert_eq!(ticks.get(), 1);
        event_loop.advance(1000);
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn cancelled_timeout_never_fires() {
        let event_loop = ManualEventLoop::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let timer = event_loop.set_timeout(100, Box::new(move || flag.set(true)));
        timer.cancel();
        event_loop.advance(1000);
        assert!(!fired.get());
        assert_eq!(event_loop.pending_timers(), 0);
    }

    #[test]
    fn same_instant_timers_fire_in_schedule_order() {
        let event_loop = ManualEventLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();
        let _a = event_loop.set_timeout(10, Box::new(move || first.borrow_mut().push("a")));
        let _b = event_loop.set_timeout(10, Box::new(move || second.borrow_mut().push("b")));
        event_loop.advance(10);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn spawned_futures_run_when_stalled() {
        let event_loop = ManualEventLoop::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        event_loop.spawn(Box::pin(async move { flag.set(true) }));
        assert!(!done.get());
        event_loop.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn timer_scheduled_from_callback_fires_in_same_advance() {
        let event_loop = Rc::new(ManualEventLoop::new());
        let fired = Rc::new(Cell::new(false));
        let inner_loop = event_loop.clone();
        let flag = fired.clone();
        let holder: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let slot = holder.clone();
        let _outer = event_loop.set_timeout(
            100,
            Box::new(move || {
                let handle = inner_loop.set_timeout(50, Box::new(move || flag.set(true)));
                *slot.borrow_mut() = Some(handle);
            }),
        );
        event_loop.advance(200);
        assert!(fired.get());
        assert_eq!(event_loop.now_ms(), 200);
    }
}
