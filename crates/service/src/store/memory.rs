use async_trait::async_trait;
use models::challan::Challan;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::store::ChallanStore;

/// In-memory store with the same replace-whole-document semantics as the
/// hosted bin. Used by tests and local development runs without bin
/// credentials.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Vec<Challan>>,
}

impl MemoryStore {
    pub fn new(seed: Vec<Challan>) -> Self {
        Self { inner: RwLock::new(seed) }
    }
}

#[async_trait]
impl ChallanStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Challan>, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn persist_all(&self, challans: &[Challan]) -> Result<(), ServiceError> {
        *self.inner.write().await = challans.to_vec();
        Ok(())
    }
}
