use std::time::Duration;

use async_trait::async_trait;
use models::challan::Challan;
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::store::ChallanStore;

const MASTER_KEY_HEADER: &str = "X-Master-Key";

/// Response envelope of the hosted bin: the stored document sits under
/// `record`, alongside metadata we ignore.
#[derive(Debug, Deserialize)]
struct BinEnvelope {
    record: Vec<Challan>,
}

/// Client for a hosted JSON-document bin (JSONBin-style API).
///
/// `GET {base}/{bin}/latest` returns the current document, `PUT
/// {base}/{bin}` replaces it wholesale. Both are authenticated with a
/// master-key header.
pub struct BinStore {
    http: reqwest::Client,
    base_url: String,
    bin_id: String,
    master_key: String,
}

impl BinStore {
    pub fn new(cfg: &configs::StoreConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            bin_id: cfg.bin_id.clone(),
            master_key: cfg.master_key.clone(),
        })
    }
}

#[async_trait]
impl ChallanStore for BinStore {
    async fn fetch_all(&self) -> Result<Vec<Challan>, ServiceError> {
        let url = format!("{}/{}/latest", self.base_url, self.bin_id);
        let resp = self
            .http
            .get(&url)
            .header(MASTER_KEY_HEADER, &self.master_key)
            .send()
            .await
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Store(format!(
                "bin fetch returned {}",
                status
            )));
        }
        let envelope = resp
            .json::<BinEnvelope>()
            .await
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        Ok(envelope.record)
    }

    async fn persist_all(&self, challans: &[Challan]) -> Result<(), ServiceError> {
        let url = format!("{}/{}", self.base_url, self.bin_id);
        let resp = self
            .http
            .put(&url)
            .header(MASTER_KEY_HEADER, &self.master_key)
            .json(challans)
            .send()
            .await
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Store(format!(
                "bin update returned {}",
                status
            )));
        }
        Ok(())
    }
}
