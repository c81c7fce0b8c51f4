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

#![cfg(target_arch = "wasm32")]

//! The Ad Mute browser extension.
//!
//! Two entry points are exported to the loader scripts:
//! [`start_content_script`] runs in every page of a supported site and
//! [`start_background`] runs in the service worker. Both hand the real work
//! to `admute_core`, supplying browser implementations of its host traits.

mod background;
pub mod chrome;
mod content;
pub mod dom;
pub mod event_loop;

pub use background::start_background;
pub use content::start_content_script;
pub use dom::{WebDocument, WebElement, WebVideo};
pub use event_loop::BrowserEventLoop;

use admute_logger::{ConsoleLogger, LoggerConfig};
use log::LevelFilter;

/// `localStorage` key a developer can set to e.g. `debug` for verbose logs.
pub const LOG_LEVEL_KEY: &str = "adMuteLogLevel";

fn init_logging(context: &'static str) {
    let default_level = if cfg!(feature = "debug-logs") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let level = admute_logger::level_override(LOG_LEVEL_KEY).unwrap_or(default_level);
    let config = LoggerConfig::for_context(context)
        .with_level(level)
        .with_targets(level >= LevelFilter::Debug);
    let _ = ConsoleLogger::init(config);
}
