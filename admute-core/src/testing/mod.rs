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

//! In-memory host implementations.
//!
//! These stand in for the browser when the core runs natively: a small DOM
//! tree with controllable geometry and media state, a virtual clock, a
//! key/value store and recording message channels. The crate's own
//! integration tests drive the whole content script through them.

mod channel;
mod dom;
mod event_loop;
mod store;

pub use channel::{RecordingChannel, RecordingTabs};
pub use dom::{MemNode, MemoryDocument};
pub use event_loop::ManualEventLoop;
pub use store::MemoryStore;
