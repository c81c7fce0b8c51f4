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

//! The per-page manager driven through the manual event loop.

mod support;

use admute_core::testing::{MemNode, MemoryStore, RecordingChannel};
use admute_core::{AdMuteManager, AdSignal, Site, VideoElement, POLL_INTERVAL_MS};
use admute_types::{AdMuteSettings, BackgroundRequest};
use support::{settings_with_delay, Page};

const TICK: u64 = POLL_INTERVAL_MS as u64;

#[test]
fn test_disabled_manager_is_inert() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    let settings = AdMuteSettings {
        enabled: false,
        ..AdMuteSettings::default()
    };

    let manager = AdMuteManager::start(&page.ctx(), settings);
    assert!(!manager.is_active());
    assert_eq!(manager.site(), None);
    assert_eq!(manager.tracked_videos(), 0);
    assert_eq!(page.event_loop.pending_timers(), 0);
    assert_eq!(page.doc.observer_count(), 0);

    page.add_skip_button();
    page.event_loop.advance(10 * TICK);
    assert_eq!(manager.ad_signal(), AdSignal::Content);
    assert!(!video.muted().unwrap());
}

#[test]
fn test_unlisted_site_is_inert() {
    let page = Page::new("example.org");
    page.add_player(1.0);

    let manager = AdMuteManager::start(&page.ctx(), AdMuteSettings::default());
    assert!(!manager.is_active());
    assert_eq!(manager.hostname(), "example.org");
    assert_eq!(page.event_loop.pending_timers(), 0);
}

#[test]
fn test_user_listed_site_uses_generic_detector() {
    let page = Page::new("video.example.org");
    let mut settings = AdMuteSettings::default();
    settings.sites.insert("example.org".to_string());

    let manager = AdMuteManager::start(&page.ctx(), settings);
    assert!(manager.is_active());
    assert_eq!(manager.site(), Some(Site::Other));
}

#[test]
fn test_start_scans_and_schedules() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(0.6);

    let manager = AdMuteManager::start(&page.ctx(), AdMuteSettings::default());
    assert!(manager.is_active());
    assert_eq!(manager.site(), Some(Site::YouTube));
    assert_eq!(manager.tracked_videos(), 1);
    assert_eq!(manager.original_volume(&video), Some(0.6));
    assert_eq!(page.event_loop.pending_timers(), 1);
    assert_eq!(page.doc.observer_count(), 1);
}

#[test]
fn test_youtube_ad_muted_after_delay_and_restored() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(0.6);
    let manager = AdMuteManager::start(&page.ctx(), AdMuteSettings::default());

    page.event_loop.advance(TICK);
    assert_eq!(manager.ad_signal(), AdSignal::Content);

    let skip = page.add_skip_button();
    page.event_loop.advance(TICK);
    assert_eq!(manager.ad_signal(), AdSignal::Ad);
    assert!(manager.has_pending_mute());
    assert!(!video.muted().unwrap(), "mute waits for the delay");
    assert_eq!(page.channel.sent(), vec![BackgroundRequest::LogAdDetected]);

    page.event_loop.advance(999);
    assert!(!video.muted().unwrap());

    page.event_loop.advance(1);
    assert!(video.muted().unwrap());
    assert!(!manager.has_pending_mute());
    assert_eq!(page.doc.live_notifications().len(), 1);

    page.doc.detach(&skip);
    page.event_loop.advance(TICK);
    assert_eq!(manager.ad_signal(), AdSignal::Content);
    assert!(!video.muted().unwrap());
    assert_eq!(video.volume().unwrap(), 0.6);
    assert_eq!(page.doc.notifications_shown(), 2);
    assert_eq!(page.channel.sent().len(), 1, "one report per ad");
}

#[test]
fn test_ad_ending_before_delay_cancels_mute() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    let manager = AdMuteManager::start(&page.ctx(), settings_with_delay(2000));

    let skip = page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(manager.has_pending_mute());

    page.doc.detach(&skip);
    page.event_loop.advance(TICK);
    assert_eq!(manager.ad_signal(), AdSignal::Content);
    assert!(!manager.has_pending_mute());
    assert_eq!(page.event_loop.pending_timers(), 1);

    page.event_loop.advance(5000);
    assert!(!video.muted().unwrap());
    assert_eq!(page.doc.notifications_shown(), 0);
}

#[test]
fn test_zero_delay_mutes_on_the_detecting_tick() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    let _manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(video.muted().unwrap());
}

#[test]
fn test_each_ad_reported_once() {
    let page = Page::new("www.youtube.com");
    page.add_player(1.0);
    let _manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));

    for _ in 0..2 {
        let skip = page.add_skip_button();
        page.event_loop.advance(4 * TICK);
        page.doc.detach(&skip);
        page.event_loop.advance(4 * TICK);
    }
    assert_eq!(
        page.channel.sent(),
        vec![
            BackgroundRequest::LogAdDetected,
            BackgroundRequest::LogAdDetected
        ]
    );
}

#[test]
fn test_late_video_muted_with_the_rest() {
    let page = Page::new("www.youtube.com");
    let (_player, first) = page.add_player(1.0);
    let manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));

    let late = page
        .doc
        .append_to_body(MemNode::new("div").with_child(MemNode::video().with_volume(0.3)));
    page.doc.flush_mutations();
    assert_eq!(manager.tracked_videos(), 2);

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(first.muted().unwrap());
    let late_video = late.children().remove(0);
    assert!(late_video.muted().unwrap());
    assert_eq!(manager.original_volume(&late_video), Some(0.3));
}

#[test]
fn test_removed_video_released_on_next_tick() {
    let page = Page::new("www.youtube.com");
    let (player, _video) = page.add_player(1.0);
    let manager = AdMuteManager::start(&page.ctx(), AdMuteSettings::default());

    page.doc.detach(&player);
    page.event_loop.advance(TICK);
    assert_eq!(manager.tracked_videos(), 0);
}

#[test]
fn test_unreachable_background_does_not_block_muting() {
    let page = Page::with_parts(
        "www.youtube.com",
        MemoryStore::new(),
        RecordingChannel::disconnected(),
    );
    let (_player, video) = page.add_player(1.0);
    let _manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(video.muted().unwrap());
}

#[test]
fn test_notifications_follow_settings() {
    let page = Page::new("www.youtube.com");
    page.add_player(1.0);
    let settings = AdMuteSettings {
        show_notifications: false,
        mute_delay: 0,
        ..AdMuteSettings::default()
    };
    let manager = AdMuteManager::start(&page.ctx(), settings);

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert_eq!(manager.visible_notifications(), 0);
    assert_eq!(page.doc.notifications_shown(), 0);
}

#[test]
fn test_teardown_restores_page() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(0.7);
    let mut manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(video.muted().unwrap());
    assert_eq!(manager.visible_notifications(), 1);

    manager.teardown();
    assert!(!manager.is_active());
    assert!(!video.muted().unwrap());
    assert_eq!(video.volume().unwrap(), 0.7);
    assert_eq!(manager.tracked_videos(), 0);
    assert_eq!(page.event_loop.pending_timers(), 0);
    assert_eq!(page.doc.observer_count(), 0);
    assert!(page.doc.live_notifications().is_empty());
    assert_eq!(page.doc.notifications_shown(), 1, "teardown unmutes quietly");
    assert_eq!(video.playback_listener_count(), 0);

    manager.teardown();
    assert!(!manager.is_active());
}

#[test]
fn test_teardown_cancels_pending_mute() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    let mut manager = AdMuteManager::start(&page.ctx(), AdMuteSettings::default());

    page.add_skip_button();
    page.event_loop.advance(TICK);
    assert!(manager.has_pending_mute());

    manager.teardown();
    page.event_loop.advance(5000);
    assert!(!video.muted().unwrap());
}

#[test]
fn test_dropping_manager_tears_down() {
    let page = Page::new("www.youtube.com");
    let (_player, video) = page.add_player(1.0);
    {
        let _manager = AdMuteManager::start(&page.ctx(), settings_with_delay(0));
        page.add_skip_button();
        page.event_loop.advance(TICK);
        assert!(video.muted().unwrap());
    }
    assert!(!video.muted().unwrap());
    assert_eq!(page.event_loop.pending_timers(), 0);
    assert_eq!(page.doc.observer_count(), 0);
}
