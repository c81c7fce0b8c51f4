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

use crate::error::ConfigError;
use crate::store::{ChangeListener, KeyValueStore};
use crate::subscription::Subscription;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, ChangeListener)>,
}

/// A storage area backed by a `HashMap`. Requests resolve immediately.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
    fail: Cell<bool>,
    listeners: Rc<RefCell<Listeners>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: Value) -> Self {
        self.values.borrow_mut().insert(key.to_string(), value);
        self
    }

    /// Make every subsequent request fail, as when the extension context
    /// has been invalidated.
    pub fn fail_requests(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn unavailable() -> ConfigError {
        ConfigError::Unavailable("storage disabled".to_string())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LocalBoxFuture<'static, Result<Option<Value>, ConfigError>> {
        let result = if self.fail.get() {
            Err(Self::unavailable())
        } else {
            Ok(self.value(key))
        };
        future::ready(result).boxed_local()
    }

    fn set(&self, key: &str, value: Value) -> LocalBoxFuture<'static, Result<(), ConfigError>> {
        if self.fail.get() {
            return future::ready(Err(Self::unavailable())).boxed_local();
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(key, Some(&value));
        }
        future::ready(Ok(())).boxed_local()
    }

    fn on_change(&self, listener: ChangeListener) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener));
            id
        };
        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .borrow_mut()
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn set_then_get_and_notify() {
        let store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _watch = store.on_change(Rc::new(move |key: &str, value: Option<&Value>| {
            sink.borrow_mut().push((key.to_string(), value.cloned()));
        }));

        block_on(store.set("k", json!(1))).unwrap();

        assert_eq!(block_on(store.get("k")).unwrap(), Some(json!(1)));
        assert_eq!(*seen.borrow(), vec![("k".to_string(), Some(json!(1)))]);
    }

    #[test]
    fn failing_store_rejects_both_directions() {
        let store = MemoryStore::new().with("k", json!(true));
        store.fail_requests(true);
        assert!(block_on(store.get("k")).is_err());
        assert!(block_on(store.set("k", json!(false))).is_err());
        assert_eq!(store.value("k"), Some(json!(true)));
    }
}
