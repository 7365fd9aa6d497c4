//! `ServiceProxy`: the live backend list for one NodePort Service, plus
//! its round-robin cursor.
//!
//! `arc-swap` is grounded on `vectordotdev-vector`'s use of the crate for
//! exactly this publish-new/retain-old-for-in-flight pattern: the refresh
//! loop swaps in a new `Vec<Backend>` every tick without taking a lock
//! requests in flight are waiting on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::backend::Backend;

pub struct ServiceProxy {
    backends: ArcSwap<Vec<Backend>>,
    cursor: AtomicUsize,
}

impl ServiceProxy {
    pub fn new(backends: Vec<Backend>) -> Self {
        ServiceProxy {
            backends: ArcSwap::from_pointee(backends),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn set_backends(&self, backends: Vec<Backend>) {
        self.backends.store(Arc::new(backends));
    }

    /// Round robin over the current backend list; `None` if it's empty.
    pub fn pick(&self) -> Option<Backend> {
        let backends = self.backends.load();
        if backends.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % backends.len();
        Some(backends[index].clone())
    }
}
