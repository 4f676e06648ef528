use std::path::Path;

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::StoreError;
use crate::reconcile::ExistingSettlement;
use crate::record::SettlementRecord;
use crate::store::Store;

const INSERT_SQL: &str = "INSERT INTO settlements
     (id, source_id, name, company_name, payout_min, payout_max, payout_display,
      deadline, days_left, requires_proof, description, claim_url, source_url,
      category, case_type, is_major_brand, created_at, updated_at)
     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)";

// id and created_at stay with the first write of a slug.
const UPSERT_SUFFIX: &str = "
     ON CONFLICT(source_id) DO UPDATE SET
        name = excluded.name,
        company_name = excluded.company_name,
        payout_min = excluded.payout_min,
        payout_max = excluded.payout_max,
        payout_display = excluded.payout_display,
        deadline = excluded.deadline,
        days_left = excluded.days_left,
        requires_proof = excluded.requires_proof,
        description = excluded.description,
        claim_url = excluded.claim_url,
        source_url = excluded.source_url,
        category = excluded.category,
        case_type = excluded.case_type,
        is_major_brand = excluded.is_major_brand,
        updated_at = excluded.updated_at";

/// Local settlements table, same shape as the hosted one.
pub struct SqliteStore {
    conn: Connection,
}

pub fn connect(path: &Path) -> Result<SqliteStore, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    info!(path = %path.display(), "opened sqlite store");
    Ok(SqliteStore { conn })
}

#[cfg(test)]
pub fn in_memory() -> Result<SqliteStore, StoreError> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(SqliteStore { conn })
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS settlements (
            source_id      TEXT PRIMARY KEY,
            id             TEXT NOT NULL,
            name           TEXT NOT NULL,
            company_name   TEXT NOT NULL,
            payout_min     REAL,
            payout_max     REAL,
            payout_display TEXT NOT NULL,
            deadline       TEXT,
            days_left      INTEGER,
            requires_proof BOOLEAN,
            description    TEXT,
            claim_url      TEXT NOT NULL,
            source_url     TEXT NOT NULL,
            category       TEXT,
            case_type      TEXT,
            is_major_brand BOOLEAN NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_settlements_claim_url ON settlements(claim_url);
        ",
    )?;
    Ok(())
}

impl SqliteStore {
    fn write(&self, sql: &str, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for r in records {
                count += stmt.execute(params![
                    r.id.to_string(),
                    r.source_id,
                    r.name,
                    r.company_name,
                    r.payout_min,
                    r.payout_max,
                    r.payout_display,
                    r.deadline.map(|d| d.to_string()),
                    r.days_left,
                    r.requires_proof.as_flag(),
                    r.eligibility,
                    r.claim_url,
                    r.source_url,
                    r.category.as_str(),
                    r.case_type,
                    r.is_major_brand,
                    r.created_at.to_rfc3339(),
                    r.updated_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }
}

impl Store for SqliteStore {
    async fn existing(&self) -> Result<Vec<ExistingSettlement>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, company_name, claim_url FROM settlements")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ExistingSettlement {
                    name: row.get(0)?,
                    company_name: row.get(1)?,
                    claim_url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn insert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        self.write(INSERT_SQL, records)
    }

    async fn upsert(&self, records: &[SettlementRecord]) -> Result<usize, StoreError> {
        self.write(&format!("{}{}", INSERT_SQL, UPSERT_SUFFIX), records)
    }
}
