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

use crate::error::MessagingError;
use crate::messaging::{MessageChannel, TabMessenger};
use admute_types::{BackgroundRequest, ContentRequest};
use std::cell::{Cell, RefCell};

/// Records every message a page sends to the background script.
pub struct RecordingChannel {
    connected: Cell<bool>,
    sent: RefCell<Vec<BackgroundRequest>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            connected: Cell::new(true),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// A channel with no receiving end; every send fails.
    pub fn disconnected() -> Self {
        let channel = Self::new();
        channel.connected.set(false);
        channel
    }

    pub fn sent(&self) -> Vec<BackgroundRequest> {
        self.sent.borrow().clone()
    }
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageChannel for RecordingChannel {
    fn notify(&self, message: &BackgroundRequest) -> Result<(), MessagingError> {
        if !self.connected.get() {
            return Err(MessagingError::NoReceiver);
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

/// Records messages sent to tabs. A `None` tab marks a broadcast.
#[derive(Default)]
pub struct RecordingTabs {
    sent: RefCell<Vec<(Option<i32>, ContentRequest)>>,
}

impl RecordingTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(Option<i32>, ContentRequest)> {
        self.sent.borrow().clone()
    }
}

impl TabMessenger for RecordingTabs {
    fn send_to_tab(&self, tab_id: i32, message: &ContentRequest) -> Result<(), MessagingError> {
        self.sent.borrow_mut().push((Some(tab_id), message.clone()));
        Ok(())
    }

    fn broadcast(&self, message: &ContentRequest) {
        self.sent.borrow_mut().push((None, message.clone()));
    }
}
