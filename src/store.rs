use crate::db::SqliteStore;
use crate::error::StoreError;
use crate::reconcile::{ExistingSettlement, Plan};
use crate::record::SettlementRecord;
use crate::rest::RestStore;

/// Where settlements are persisted. Writes are whole-batch: either every row
/// lands or the call fails.
pub trait Store {
    /// Comparison columns of every stored settlement.
    async fn existing(&self) -> Result<Vec<ExistingSettlement>, StoreError>;
    async fn insert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError>;
    /// Insert or overwrite, keyed on `source_id`.
    async fn upsert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError>;
}

pub enum Backend {
    Rest(RestStore),
    Sqlite(SqliteStore),
}

impl Store for Backend {
    async fn existing(&self) -> Result<Vec<ExistingSettlement>, StoreError> {
        match self {
            Backend::Rest(s) => s.existing().await,
            Backend::Sqlite(s) => s.existing().await,
        }
    }

    async fn insert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        match self {
            Backend::Rest(s) => s.insert(records).await,
            Backend::Sqlite(s) => s.insert(records).await,
        }
    }

    async fn upsert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        match self {
            Backend::Rest(s) => s.upsert(records).await,
            Backend::Sqlite(s) => s.upsert(records).await,
        }
    }
}

/// Write a reconciliation plan. Returns rows written.
pub async fn apply<S: Store>(store: &S, plan: &Plan) -> Result<usize, StoreError> {
    let mut written = 0;
    if !plan.inserts.is_empty() {
        written += store.insert(&plan.inserts).await?;
    }
    if !plan.upserts.is_empty() {
        written += store.upsert(&plan.upserts).await?;
    }
    Ok(written)
}
