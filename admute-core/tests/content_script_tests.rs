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
 */

//! The content script runtime: startup, message handling and restarts.

mod support;

use admute_core::testing::{MemoryStore, RecordingChannel};
use admute_core::{ContentScript, KeyValueStore, Site, VideoElement, POLL_INTERVAL_MS};
use admute_types::{AdMuteSettings, ContentRequest, ContentResponse, SETTINGS_KEY};
use futures::executor::block_on;
use serde_json::json;
use support::{settings_with_delay, Page};

const TICK: u64 = POLL_INTERVAL_MS as u64;

fn disabled() -> AdMuteSettings {
    AdMuteSettings {
        enabled: false,
        ..AdMuteSettings::default()
    }
}

#[test]
fn test_start_waits_for_settings() {
    let page = Page::with_settings("www.youtube.com", &AdMuteSettings::default());
    page.add_player(1.0);
    let script = ContentScript::new(page.ctx());

    script.start();
    assert!(!script.is_active(), "settings load is asynchronous");

    page.event_loop.run_until_stalled();
    assert!(script.is_active());
    assert_eq!(
        script.with_manager(|manager| manager.site()),
        Some(Some(Site::YouTube))
    );
}

#[test]
fn test_start_twice_starts_one_manager() {
    let page = Page::new("www.youtube.com");
    let script = ContentScript::new(page.ctx());

    script.start();
    script.start();
    page.event_loop.run_until_stalled();
    assert_eq!(page.doc.observer_count(), 1);
    assert_eq!(page.event_loop.pending_timers(), 1);
}

#[test]
fn test_missing_or_unreadable_settings_use_defaults() {
    let unreadable = MemoryStore::new().with(SETTINGS_KEY, json!({ "enabled": "sometimes" }));
    for store in [MemoryStore::new(), unreadable] {
        let page = Page::with_parts("www.tving.com", store, RecordingChannel::new());
        let script = ContentScript::new(page.ctx());
        script.start();
        page.event_loop.run_until_stalled();
        assert!(script.is_active());
    }

    let page = Page::new("www.tving.com");
    page.store.fail_requests(true);
    let script = ContentScript::new(page.ctx());
    script.start();
    page.event_loop.run_until_stalled();
    assert!(script.is_active());
}

#[test]
fn test_ping() {
    let page = Page::new("www.netflix.com");
    let script = ContentScript::new(page.ctx());
    let reply = script.handle(&ContentRequest::Ping);
    assert_eq!(reply, ContentResponse::pong());
    assert_eq!(serde_json::to_value(reply).unwrap(), json!({ "pong": true }));
}

#[test]
fn test_get_status_reports_running_manager() {
    let page = Page::with_settings("www.wavve.com", &disabled());
    let script = ContentScript::new(page.ctx());
    script.start();
    page.event_loop.run_until_stalled();

    let reply = script.handle(&ContentRequest::GetStatus);
    assert_eq!(
        serde_json::to_value(reply).unwrap(),
        json!({ "enabled": false, "site": "www.wavve.com" })
    );

    let page = Page::new("www.wavve.com");
    let script = ContentScript::new(page.ctx());
    script.start();
    page.event_loop.run_until_stalled();
    assert_eq!(
        script.handle(&ContentRequest::GetStatus),
        ContentResponse::status(true, "www.wavve.com")
    );
}

#[test]
fn test_update_settings_restarts_with_new_values() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    let script = ContentScript::new(page.ctx());
    script.start();
    page.event_loop.run_until_stalled();

    page.add_skip_button();
    page.event_loop.advance(TICK + 1000);
    assert!(video.muted().unwrap());

    let stored = serde_json::to_value(disabled()).unwrap();
    block_on(page.store.set(SETTINGS_KEY, stored)).unwrap();

    let reply = script.handle(&ContentRequest::UpdateSettings);
    assert_eq!(
        serde_json::to_value(reply).unwrap(),
        json!({ "success": true })
    );
    assert!(!video.muted().unwrap(), "old manager restored the page");

    page.event_loop.run_until_stalled();
    assert!(!script.is_active());
    assert_eq!(page.event_loop.pending_timers(), 0);
    assert_eq!(page.doc.observer_count(), 0);

    page.event_loop.advance(10 * TICK);
    assert!(!video.muted().unwrap());
}

#[test]
fn test_rapid_updates_keep_only_the_last_load() {
    let page = Page::with_settings("www.youtube.com", &settings_with_delay(300));
    let script = ContentScript::new(page.ctx());
    script.start();
    script.handle(&ContentRequest::UpdateSettings);
    script.handle(&ContentRequest::UpdateSettings);

    page.event_loop.run_until_stalled();
    assert!(script.is_active());
    assert_eq!(page.doc.observer_count(), 1);
    assert_eq!(page.event_loop.pending_timers(), 1);
}

#[test]
fn test_shutdown_discards_pending_load() {
    let page = Page::new("www.youtube.com");
    let script = ContentScript::new(page.ctx());
    script.start();
    script.shutdown();

    page.event_loop.run_until_stalled();
    assert!(!script.is_active());
    assert_eq!(page.event_loop.pending_timers(), 0);
}

#[test]
fn test_shutdown_restores_muted_videos() {
    let page = Page::with_settings("www.youtube.com", &settings_with_delay(0));
    let (_player, video) = page.add_player(0.5);
    let script = ContentScript::new(page.ctx());
    script.start();
    page.event_loop.run_until_stalled();

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(video.muted().unwrap());

    script.shutdown();
    assert!(!video.muted().unwrap());
    assert_eq!(video.volume().unwrap(), 0.5);
    assert!(!script.is_active());
    assert_eq!(page.event_loop.pending_timers(), 0);
}

#[test]
fn test_unknown_action_is_rejected_at_decode() {
    let decoded = serde_json::from_value::<ContentRequest>(json!({ "action": "reload" }));
    assert!(decoded.is_err());
}
