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

//! Outbound messaging to other extension contexts.

use crate::error::MessagingError;
use admute_types::{BackgroundRequest, ContentRequest};

/// Fire-and-forget channel from a page to the background script.
///
/// An `Err` only means the message was not delivered; senders are expected
/// to log it and carry on.
pub trait MessageChannel {
    fn notify(&self, message: &BackgroundRequest) -> Result<(), MessagingError>;
}

/// Messages from the background script to content scripts in tabs.
pub trait TabMessenger {
    /// Send `message` to one tab. Delivery failures are logged by the host.
    fn send_to_tab(&self, tab_id: i32, message: &ContentRequest) -> Result<(), MessagingError>;

    /// Send `message` to every open tab, ignoring tabs without a receiver.
    fn broadcast(&self, message: &ContentRequest);
}
