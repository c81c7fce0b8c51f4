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

//! Video tracking and the mute controller.

use admute_core::notification::{TOAST_DISPLAY_MS, TOAST_FADE_MS};
use admute_core::testing::{ManualEventLoop, MemNode, MemoryDocument};
use admute_core::{
    BatchOutcome, MuteController, PageDocument, PageElement, VideoElement, VideoRegistry,
};
use std::cell::RefCell;
use std::rc::Rc;

fn controller(
    doc: &Rc<MemoryDocument>,
    event_loop: &Rc<ManualEventLoop>,
    show_notifications: bool,
) -> MuteController<MemoryDocument> {
    MuteController::new(doc.clone(), event_loop.clone(), show_notifications)
}

#[test]
fn test_scan_registers_each_video_once() {
    let doc = MemoryDocument::new("www.youtube.com");
    let first = doc.append_to_body(MemNode::video());
    doc.append_to_body(MemNode::new("div").with_child(MemNode::video()));

    let mut registry = VideoRegistry::new();
    assert_eq!(registry.scan_document(&doc), 2);
    assert_eq!(registry.scan_document(&doc), 0);
    assert!(!registry.register_if_new(first.clone()));
    assert_eq!(registry.len(), 2);
    assert_eq!(first.playback_listener_count(), 1);
}

#[test]
fn test_registration_remembers_current_volume() {
    let doc = MemoryDocument::new("www.youtube.com");
    let quiet = doc.append_to_body(MemNode::video().with_volume(0.25));
    let broken = doc.append_to_body(MemNode::video());
    broken.reject_media_io(true);

    let mut registry = VideoRegistry::new();
    registry.scan_document(&doc);

    assert_eq!(registry.original_volume(&quiet), Some(0.25));
    assert!(registry.contains(&broken));
    assert_eq!(registry.original_volume(&broken), None);
}

#[test]
fn test_nested_video_found_through_observer() {
    let doc = Rc::new(MemoryDocument::new("www.wavve.com"));
    let registry = Rc::new(RefCell::new(VideoRegistry::new()));

    let observed_doc = Rc::downgrade(&doc);
    let observed_registry = registry.clone();
    let _observer = doc
        .observe_added_nodes(Rc::new(move |added: Vec<MemNode>| {
            if let Some(doc) = observed_doc.upgrade() {
                observed_registry.borrow_mut().scan_added(&*doc, &added);
            }
        }))
        .unwrap();

    let video = MemNode::video();
    doc.append_to_body(
        MemNode::new("div").with_child(
            MemNode::new("section").with_child(MemNode::new("div").with_child(video.clone())),
        ),
    );
    assert!(registry.borrow().is_empty(), "delivery waits for a flush");

    doc.flush_mutations();
    assert!(registry.borrow().contains(&video));

    let direct = MemNode::video();
    doc.append_to_body(direct.clone());
    doc.flush_mutations();
    assert!(registry.borrow().contains(&direct));
    assert_eq!(registry.borrow().len(), 2);
}

#[test]
fn test_detached_subtree_not_reported() {
    let doc = MemoryDocument::new("www.wavve.com");
    let seen = Rc::new(RefCell::new(0));
    let counter = seen.clone();
    let _observer = doc
        .observe_added_nodes(Rc::new(move |added: Vec<MemNode>| {
            *counter.borrow_mut() += added.len();
        }))
        .unwrap();

    let orphan = MemNode::new("div");
    doc.append(&orphan, MemNode::video());
    doc.flush_mutations();
    assert_eq!(*seen.borrow(), 0);
}

#[test]
fn test_prune_releases_detached_videos() {
    let doc = MemoryDocument::new("www.youtube.com");
    let kept = doc.append_to_body(MemNode::video());
    let removed = doc.append_to_body(MemNode::video());

    let mut registry = VideoRegistry::new();
    registry.scan_document(&doc);
    doc.detach(&removed);

    assert_eq!(registry.prune_detached(), 1);
    assert!(registry.contains(&kept));
    assert!(!registry.contains(&removed));
    assert_eq!(removed.playback_listener_count(), 0);
}

#[test]
fn test_mute_then_unmute_restores_volume() {
    let doc = Rc::new(MemoryDocument::new("www.youtube.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    let video = doc.append_to_body(MemNode::video().with_volume(0.8));
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);

    // The user turned it down after the page loaded.
    video.user_set_volume(0.4);

    let controller = controller(&doc, &event_loop, false);
    let muted = controller.mute_all(&mut registry);
    assert_eq!(
        muted,
        BatchOutcome {
            changed: 1,
            failed: 0
        }
    );
    assert!(video.muted().unwrap());
    assert_eq!(registry.original_volume(&video), Some(0.4));

    video.user_set_volume(0.1);
    let unmuted = controller.unmute_all(&mut registry);
    assert_eq!(unmuted.changed, 1);
    assert!(!video.muted().unwrap());
    assert_eq!(video.volume().unwrap(), 0.4);
}

#[test]
fn test_mute_and_unmute_are_idempotent() {
    let doc = Rc::new(MemoryDocument::new("www.youtube.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);
    let controller = controller(&doc, &event_loop, true);

    assert_eq!(controller.mute_all(&mut registry).changed, 1);
    assert_eq!(controller.mute_all(&mut registry).changed, 0);
    assert_eq!(doc.notifications_shown(), 1);

    assert_eq!(controller.unmute_all(&mut registry).changed, 1);
    assert_eq!(controller.unmute_all(&mut registry).changed, 0);
    assert_eq!(doc.notifications_shown(), 2);
}

#[test]
fn test_one_failing_video_does_not_stop_the_rest() {
    let doc = Rc::new(MemoryDocument::new("www.tving.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    let broken = doc.append_to_body(MemNode::video());
    let healthy = doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);
    broken.reject_media_io(true);

    let controller = controller(&doc, &event_loop, false);
    let outcome = controller.mute_all(&mut registry);
    assert_eq!(
        outcome,
        BatchOutcome {
            changed: 1,
            failed: 1
        }
    );
    assert!(healthy.muted().unwrap());
}

#[test]
fn test_detached_video_skipped() {
    let doc = Rc::new(MemoryDocument::new("www.tving.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    let video = doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);
    doc.detach(&video);

    let outcome = controller(&doc, &event_loop, false).mute_all(&mut registry);
    assert_eq!(outcome, BatchOutcome::default());
    assert!(!video.muted().unwrap());
}

#[test]
fn test_toast_fades_then_disappears() {
    let doc = Rc::new(MemoryDocument::new("www.youtube.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);
    let controller = controller(&doc, &event_loop, true);

    controller.mute_all(&mut registry);
    let toasts = doc.live_notifications();
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].text_content().contains("광고 음소거 활성화"));
    assert_eq!(toasts[0].opacity(), None);

    event_loop.advance(u64::from(TOAST_DISPLAY_MS));
    assert_eq!(toasts[0].opacity().as_deref(), Some("0"));
    assert_eq!(doc.live_notifications().len(), 1);

    event_loop.advance(u64::from(TOAST_FADE_MS));
    assert!(doc.live_notifications().is_empty());
    assert_eq!(controller.visible_notifications(), 0);
    assert_eq!(event_loop.pending_timers(), 0);
}

#[test]
fn test_dismiss_removes_toasts_and_timers() {
    let doc = Rc::new(MemoryDocument::new("www.youtube.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);
    let controller = controller(&doc, &event_loop, true);

    controller.mute_all(&mut registry);
    controller.unmute_all(&mut registry);
    assert_eq!(controller.visible_notifications(), 2);
    assert_eq!(event_loop.pending_timers(), 2);

    controller.dismiss_notifications();
    assert!(doc.live_notifications().is_empty());
    assert_eq!(event_loop.pending_timers(), 0);
}

#[test]
fn test_notifications_disabled() {
    let doc = Rc::new(MemoryDocument::new("www.youtube.com"));
    let event_loop = Rc::new(ManualEventLoop::new());
    doc.append_to_body(MemNode::video());
    let mut registry = VideoRegistry::new();
    registry.scan_document(&*doc);

    controller(&doc, &event_loop, false).mute_all(&mut registry);
    assert_eq!(doc.notifications_shown(), 0);
    assert_eq!(event_loop.pending_timers(), 0);
}
