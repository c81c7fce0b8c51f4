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

//! `log` backend for extension contexts: every record goes to the page or
//! service worker console, tagged so it stands out among the host page's own
//! output.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::console;

#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Printed in front of every line, e.g. `[AdMute]`.
    pub prefix: &'static str,
    /// Which script is logging: `content` or `background`.
    pub context: &'static str,
    pub console_level: LevelFilter,
    /// Include the record target (module path) in each line.
    pub show_target: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            prefix: "[AdMute]",
            context: "content",
            console_level: LevelFilter::Info,
            show_target: false,
        }
    }
}

impl LoggerConfig {
    pub fn for_context(context: &'static str) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    pub fn with_targets(mut self, show_target: bool) -> Self {
        self.show_target = show_target;
        self
    }
}

pub struct ConsoleLogger {
    config: LoggerConfig,
}

impl ConsoleLogger {
    pub fn init(config: LoggerConfig) -> Result<(), log::SetLoggerError> {
        let level = config.console_level;
        // set_logger needs a 'static reference and the logger lives as long
        // as the script anyway.
        let leaked: &'static ConsoleLogger = Box::leak(Box::new(ConsoleLogger { config }));
        log::set_logger(leaked)?;
        log::set_max_level(level);
        Ok(())
    }

    fn format(&self, record: &Record) -> String {
        let LoggerConfig {
            prefix,
            context,
            show_target,
            ..
        } = &self.config;
        if *show_target {
            format!(
                "{prefix} {context} {}: {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            format!("{prefix} {context} {}: {}", record.level(), record.args())
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level().to_level_filter() <= self.config.console_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&self.format(record));
        match record.level() {
            Level::Error => console::error_1(&msg),
            Level::Warn => console::warn_1(&msg),
            Level::Info => console::info_1(&msg),
            Level::Debug => console::log_1(&msg),
            Level::Trace => console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Read a level override left in `localStorage` under `key`, e.g. `debug`.
/// Lets a developer turn on verbose output for one profile without a rebuild.
pub fn level_override(key: &str) -> Option<LevelFilter> {
    let global = js_sys::global();
    let storage = js_sys::Reflect::get(&global, &JsValue::from_str("localStorage")).ok()?;
    if storage.is_undefined() || storage.is_null() {
        return None;
    }
    let get_item = js_sys::Reflect::get(&storage, &JsValue::from_str("getItem")).ok()?;
    let get_item: js_sys::Function = get_item.dyn_into().ok()?;
    let value = get_item.call1(&storage, &JsValue::from_str(key)).ok()?;
    value.as_string()?.parse().ok()
}
