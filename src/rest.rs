use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::StoreError;
use crate::reconcile::ExistingSettlement;
use crate::record::SettlementRecord;
use crate::store::Store;

const TABLE: &str = "settlements";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Settlements table behind a PostgREST (Supabase) endpoint.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl RestStore {
    /// `base_url` is the project URL, e.g. `https://abc.supabase.co`.
    pub fn new(base_url: &str, key: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    async fn write<T: Serialize>(
        &self,
        url: String,
        prefer: &str,
        rows: &[T],
    ) -> Result<usize, StoreError> {
        info!(url = %url, count = rows.len(), "writing settlements");
        let resp = self
            .authed(self.client.post(&url))
            .header("Prefer", prefer)
            .json(rows)
            .send()
            .await?;
        check(resp).await?;
        Ok(rows.len())
    }
}

/// Upsert rows without `created_at`, so a merge keeps the stored value and a
/// fresh row takes the column default.
fn upsert_rows(records: &[SettlementRecord]) -> Result<Vec<Value>, StoreError> {
    records
        .iter()
        .map(|r| -> Result<Value, StoreError> {
            let mut row = serde_json::to_value(r)?;
            if let Value::Object(map) = &mut row {
                map.remove("created_at");
            }
            Ok(row)
        })
        .collect()
}

async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Server {
        status: status.as_u16(),
        body,
    })
}

impl Store for RestStore {
    async fn existing(&self) -> Result<Vec<ExistingSettlement>, StoreError> {
        let url = format!("{}?select=name,company_name,claim_url", self.table_url());
        info!(url = %url, "reading existing settlements");
        let resp = self.authed(self.client.get(&url)).send().await?;
        let body = check(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn insert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        self.write(self.table_url(), "return=minimal", records).await
    }

    async fn upsert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        let url = format!("{}?on_conflict=source_id", self.table_url());
        let rows = upsert_rows(records)?;
        self.write(url, "resolution=merge-duplicates,return=minimal", &rows)
            .await
    }
}
