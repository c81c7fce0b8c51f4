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

//! The small on-page toast shown when audio is muted or restored.

use crate::dom::PageDocument;
use crate::platform::{EventLoop, TimerHandle};
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// How long a toast stays fully visible.
pub const TOAST_DISPLAY_MS: u32 = 3000;
/// Length of the fade-out transition before the node is removed.
pub const TOAST_FADE_MS: u32 = 300;

/// Inline style of the toast root. The toast deliberately has no id or
/// class so it never looks like ad UI to the generic detector.
pub const TOAST_STYLE: &str = "position: fixed; top: 20px; right: 20px; \
background: rgba(0, 0, 0, 0.8); color: white; padding: 12px 16px; border-radius: 6px; \
font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
font-size: 14px; z-index: 999999; max-width: 300px; \
box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3); transition: opacity 0.3s ease;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn muted() -> Self {
        Self {
            title: "🔇 광고 음소거 활성화".to_string(),
            message: "광고가 감지되어 자동으로 음소거되었습니다.".to_string(),
        }
    }

    pub fn unmuted() -> Self {
        Self {
            title: "🔊 음소거 해제".to_string(),
            message: "광고가 종료되어 음소거가 해제되었습니다.".to_string(),
        }
    }
}

struct ActiveToast<E> {
    element: E,
    timer: Option<TimerHandle>,
}

struct TrayState<E> {
    next_id: u64,
    toasts: HashMap<u64, ActiveToast<E>>,
}

/// Toasts currently on screen and the timers that will take them down.
pub struct ToastTray<D: PageDocument> {
    doc: Rc<D>,
    event_loop: Rc<dyn EventLoop>,
    state: Rc<RefCell<TrayState<D::Element>>>,
}

impl<D: PageDocument> ToastTray<D> {
    pub fn new(doc: Rc<D>, event_loop: Rc<dyn EventLoop>) -> Self {
        Self {
            doc,
            event_loop,
            state: Rc::new(RefCell::new(TrayState {
                next_id: 0,
                toasts: HashMap::new(),
            })),
        }
    }

    /// Put a toast on the page. It fades after [`TOAST_DISPLAY_MS`] and is
    /// removed [`TOAST_FADE_MS`] later.
    pub fn show(&self, notification: &Notification) {
        let element = match self.doc.show_notification(notification) {
            Ok(element) => element,
            Err(e) => {
                debug!("Could not show notification: {e}");
                return;
            }
        };

        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.toasts.insert(
                id,
                ActiveToast {
                    element,
                    timer: None,
                },
            );
            id
        };

        let timer = self.event_loop.set_timeout(
            TOAST_DISPLAY_MS,
            Box::new(Self::fade_step(
                id,
                self.doc.clone(),
                self.event_loop.clone(),
                Rc::downgrade(&self.state),
            )),
        );
        if let Some(toast) = self.state.borrow_mut().toasts.get_mut(&id) {
            toast.timer = Some(timer);
        }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel every pending toast timer and remove the toasts right away.
    pub fn dismiss_all(&self) {
        let toasts: Vec<_> = self.state.borrow_mut().toasts.drain().collect();
        for (_, toast) in toasts {
            if let Some(timer) = toast.timer {
                timer.cancel();
            }
            self.doc.remove(&toast.element);
        }
    }

    fn fade_step(
        id: u64,
        doc: Rc<D>,
        event_loop: Rc<dyn EventLoop>,
        state: Weak<RefCell<TrayState<D::Element>>>,
    ) -> impl FnOnce() {
        move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            let Some(element) = state
                .borrow()
                .toasts
                .get(&id)
                .map(|toast| toast.element.clone())
            else {
                return;
            };
            doc.fade_out(&element);

            let weak = Rc::downgrade(&state);
            let remove_doc = doc.clone();
            let timer = event_loop.set_timeout(
                TOAST_FADE_MS,
                Box::new(move || {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    let removed = state.borrow_mut().toasts.remove(&id);
                    if let Some(toast) = removed {
                        remove_doc.remove(&toast.element);
                    }
                }),
            );
            if let Some(toast) = state.borrow_mut().toasts.get_mut(&id) {
                toast.timer = Some(timer);
            };
        }
    }
}
