//! Typed access to the key-value store that backs the nanokube control
//! plane (spec.md §4.1).
//!
//! The KV layer itself ([`kv::Kv`]) is assumed to be an external
//! collaborator in production (spec.md §1: "the backing key-value store
//! with pub/sub"); [`memory::InMemoryKv`] is the one concrete
//! implementation this crate ships, used for tests and for the
//! single-process demo wiring. [`Store`] is the typed wrapper with the
//! `pods:<namespace>:<name>` key schema spec.md §4.1 documents.

pub mod error;
pub mod kv;
pub mod memory;
pub mod port_allocator;
pub mod retry;
pub mod store;

pub use error::StoreError;
pub use kv::Kv;
pub use memory::InMemoryKv;
pub use port_allocator::{PortAllocator, PortAllocatorError};
pub use store::{Kind, Store};

/// The pub/sub channel pod lifecycle events are published to, per spec.md
/// §4.1.
pub const POD_EVENTS_CHANNEL: &str = "pods:events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodEventType {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for PodEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PodEventType::Create => "create",
            PodEventType::Update => "update",
            PodEventType::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Formats a pod event message as `<eventType>:<namespace>/<name>`, per
/// spec.md §4.1.
pub fn pod_event_message(kind: PodEventType, namespace: &str, name: &str) -> String {
    format!("{}:{}/{}", kind, namespace, name)
}
