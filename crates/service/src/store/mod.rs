pub mod bin;
pub mod memory;

use async_trait::async_trait;
use models::challan::Challan;

use crate::errors::ServiceError;

/// Backing store for the challan collection.
///
/// The collection lives as one JSON array with whole-document replace
/// semantics, so the contract is deliberately coarse: read everything,
/// write everything. Last writer wins; there is no conflict detection.
#[async_trait]
pub trait ChallanStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Challan>, ServiceError>;
    async fn persist_all(&self, challans: &[Challan]) -> Result<(), ServiceError>;
}
