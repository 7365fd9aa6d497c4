//! The NodePort allocator, per spec.md §4.5: a mutex-serialized set of used
//! ports in `[30000, 32767]`, persisted to a well-known KV key so
//! allocations survive restart.
//!
//! Owned exclusively by `nanokube-apiserver`: it validates and allocates
//! on Service creation, and releases on Service deletion
//! (`routes/services.rs`). `nanokube-proxy` never touches this allocator
//! directly — it discovers already-allocated `nodePort`s purely by reading
//! Services through `nanokube-client`, since a proxy instance runs as its
//! own per-node process with no assumed access to the control plane's KV.

use std::collections::BTreeSet;
use std::sync::Arc;

use nanokube_types::service::NODE_PORT_RANGE;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::kv::Kv;

const ALLOCATOR_KEY: &str = "proxy:allocated-ports";

#[derive(Debug, Error)]
pub enum PortAllocatorError {
    #[error("node port range [{}, {}] is exhausted", NODE_PORT_RANGE.start(), NODE_PORT_RANGE.end())]
    RangeExhausted,
    #[error("port {0} is already allocated")]
    AlreadyAllocated(u16),
    #[error("port {0} is outside the node port range")]
    OutOfRange(u16),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Guards all reads and writes to the allocated-port set with a single
/// mutex: duplicate allocation of the same port is an invariant violation,
/// never a racy outcome.
pub struct PortAllocator {
    kv: Arc<dyn Kv>,
    lock: Mutex<()>,
}

impl PortAllocator {
    pub fn new(kv: Arc<dyn Kv>) -> Self {
        PortAllocator {
            kv,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeSet<u16>, PortAllocatorError> {
        match self.kv.get(ALLOCATOR_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw).map_err(StoreError::from)?),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn save(&self, ports: &BTreeSet<u16>) -> Result<(), PortAllocatorError> {
        let encoded = serde_json::to_string(ports).map_err(StoreError::from)?;
        self.kv.set(ALLOCATOR_KEY, &encoded, None).await?;
        Ok(())
    }

    /// Returns the lowest unused port in the range.
    pub async fn allocate(&self) -> Result<u16, PortAllocatorError> {
        let _guard = self.lock.lock().await;
        let mut ports = self.load().await?;
        let next = NODE_PORT_RANGE.into_iter().find(|p| !ports.contains(p));
        match next {
            Some(port) => {
                ports.insert(port);
                self.save(&ports).await?;
                Ok(port)
            }
            None => Err(PortAllocatorError::RangeExhausted),
        }
    }

    /// Reserves a caller-chosen port (an explicit `nodePort` on a Service).
    /// Fails if the port is already in use or outside the range, per the
    /// 409-Conflict semantics spec.md §7 assigns to NodePort collisions.
    pub async fn reserve(&self, port: u16) -> Result<(), PortAllocatorError> {
        if !NODE_PORT_RANGE.contains(&port) {
            return Err(PortAllocatorError::OutOfRange(port));
        }
        let _guard = self.lock.lock().await;
        let mut ports = self.load().await?;
        if ports.contains(&port) {
            return Err(PortAllocatorError::AlreadyAllocated(port));
        }
        ports.insert(port);
        self.save(&ports).await
    }

    pub async fn release(&self, port: u16) -> Result<(), PortAllocatorError> {
        let _guard = self.lock.lock().await;
        let mut ports = self.load().await?;
        ports.remove(&port);
        self.save(&ports).await
    }

    pub async fn allocated(&self) -> Result<BTreeSet<u16>, PortAllocatorError> {
        self.load().await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::InMemoryKv;

    fn allocator() -> PortAllocator {
        PortAllocator::new(Arc::new(InMemoryKv::new()))
    }

    #[tokio::test]
    async fn allocate_returns_lowest_unused_port() {
        let allocator = allocator();
        assert_eq!(allocator.allocate().await.unwrap(), 30000);
        assert_eq!(allocator.allocate().await.unwrap(), 30001);
    }

    #[tokio::test]
    async fn reserve_rejects_duplicate() {
        let allocator = allocator();
        allocator.reserve(30080).await.unwrap();
        let err = allocator.reserve(30080).await.unwrap_err();
        assert!(matches!(err, PortAllocatorError::AlreadyAllocated(30080)));
    }

    #[tokio::test]
    async fn reserve_rejects_out_of_range_port() {
        let allocator = allocator();
        let err = allocator.reserve(8080).await.unwrap_err();
        assert!(matches!(err, PortAllocatorError::OutOfRange(8080)));
    }

    #[tokio::test]
    async fn release_frees_port_for_reuse() {
        let allocator = allocator();
        let port = allocator.allocate().await.unwrap();
        allocator.release(port).await.unwrap();
        allocator.reserve(port).await.unwrap();
    }

    #[tokio::test]
    async fn allocations_persist_across_allocator_instances() {
        let kv: Arc<dyn Kv> = Arc::new(InMemoryKv::new());
        let first = PortAllocator::new(kv.clone());
        let port = first.allocate().await.unwrap();
        let second = PortAllocator::new(kv);
        let err = second.reserve(port).await.unwrap_err();
        assert!(matches!(err, PortAllocatorError::AlreadyAllocated(_)));
    }
}
