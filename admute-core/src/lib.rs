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

//! Ad detection and muting for video streaming pages.
//!
//! The crate holds everything the extension does that does not need a
//! browser. Page access, timers, storage and messaging sit behind small
//! traits ([`dom::PageDocument`], [`platform::EventLoop`],
//! [`store::KeyValueStore`], [`messaging::MessageChannel`]) so the same code
//! runs against `web_sys` in the extension and against the in-memory host in
//! [`testing`] natively.
//!
//! A content script wires things together like this:
//!
//! ```ignore
//! let script = ContentScript::new(PageContext {
//!     doc: Rc::new(page),
//!     event_loop: Rc::new(event_loop),
//!     settings_store: Rc::new(sync_storage),
//!     channel: Rc::new(runtime),
//! });
//! script.start();
//! // for every runtime message:
//! let reply = script.handle(&request);
//! // on unload:
//! script.shutdown();
//! ```

pub mod background;
pub mod content;
pub mod controller;
pub mod detect;
pub mod dom;
pub mod error;
pub mod manager;
pub mod messaging;
pub mod notification;
pub mod platform;
pub mod registry;
pub mod selector;
pub mod state;
pub mod store;
pub mod subscription;
pub mod testing;

pub use background::Background;
pub use content::ContentScript;
pub use controller::{BatchOutcome, MuteController};
pub use detect::{AdDetector, Site, SiteDetector};
pub use dom::{BoxSize, PageDocument, PageElement, PlaybackEvent, VideoElement};
pub use error::{ConfigError, DomError, MessagingError};
pub use manager::{AdMuteManager, PageContext, POLL_INTERVAL_MS};
pub use messaging::{MessageChannel, TabMessenger};
pub use notification::{Notification, ToastTray};
pub use platform::{EventLoop, TimerHandle};
pub use registry::VideoRegistry;
pub use selector::Selector;
pub use state::{AdSignal, AdStateMachine, Transition};
pub use store::{load_settings, KeyValueStore};
pub use subscription::Subscription;
