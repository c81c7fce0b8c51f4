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

//! The content script runtime: owns the page's [`AdMuteManager`] and answers
//! messages from the popup and background script.

use crate::dom::PageDocument;
use crate::manager::{AdMuteManager, PageContext};
use crate::store::load_settings;
use admute_types::{ContentRequest, ContentResponse};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct ContentScript<D: PageDocument> {
    ctx: PageContext<D>,
    manager: Rc<RefCell<Option<AdMuteManager<D>>>>,
    /// Bumped on every (re)start and on shutdown so a settings load that
    /// resolves late cannot install a manager for a superseded request.
    generation: Rc<Cell<u64>>,
    started: Cell<bool>,
}

impl<D: PageDocument> ContentScript<D> {
    pub fn new(ctx: PageContext<D>) -> Self {
        Self {
            ctx,
            manager: Rc::new(RefCell::new(None)),
            generation: Rc::new(Cell::new(0)),
            started: Cell::new(false),
        }
    }

    /// Load settings and start the manager. Only the first call does
    /// anything; use [`ContentRequest::UpdateSettings`] to restart.
    pub fn start(&self) {
        if self.started.replace(true) {
            return;
        }
        self.launch();
    }

    pub fn handle(&self, request: &ContentRequest) -> ContentResponse {
        match request {
            ContentRequest::Ping => ContentResponse::pong(),
            ContentRequest::UpdateSettings => {
                info!("Settings changed, restarting");
                self.stop_manager();
                self.started.set(true);
                self.launch();
                ContentResponse::updated()
            }
            ContentRequest::GetStatus => {
                ContentResponse::status(self.is_active(), self.ctx.doc.hostname())
            }
        }
    }

    /// Page is going away: tear the manager down and ignore any load still
    /// in flight.
    pub fn shutdown(&self) {
        self.generation.set(self.generation.get() + 1);
        self.stop_manager();
    }

    /// Whether a manager is currently watching the page.
    pub fn is_active(&self) -> bool {
        self.manager
            .borrow()
            .as_ref()
            .is_some_and(AdMuteManager::is_active)
    }

    /// Inspect the running manager, if any.
    pub fn with_manager<R>(&self, f: impl FnOnce(&AdMuteManager<D>) -> R) -> Option<R> {
        self.manager.borrow().as_ref().map(f)
    }

    fn stop_manager(&self) {
        let previous = self.manager.borrow_mut().take();
        if let Some(mut manager) = previous {
            manager.teardown();
        }
    }

    fn launch(&self) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let ctx = self.ctx.clone();
        let current = self.generation.clone();
        let slot = Rc::downgrade(&self.manager);

        self.ctx.event_loop.spawn(Box::pin(async move {
            let settings = load_settings(&*ctx.settings_store).await;
            if current.get() != generation {
                debug!("Discarding settings load superseded by a newer restart");
                return;
            }
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let manager = AdMuteManager::start(&ctx, settings);
            let previous = slot.borrow_mut().replace(manager);
            if let Some(mut previous) = previous {
                previous.teardown();
            }
        }));
    }
}
