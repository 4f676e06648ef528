use std::collections::HashSet;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::record::SettlementRecord;

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Insert only records the store has never seen; never touch existing rows.
    AppendOnly,
    /// Write every record, letting the store overwrite rows with the same slug.
    Upsert,
}

/// The columns of an existing row that the append-only policy compares on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExistingSettlement {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub claim_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Name,
    Company,
    ClaimUrl,
}

#[derive(Debug, Default)]
pub struct Plan {
    pub inserts: Vec<SettlementRecord>,
    pub upserts: Vec<SettlementRecord>,
    pub skipped: Vec<(SettlementRecord, SkipReason)>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.upserts.is_empty()
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lower, "");
    WS_RE.replace_all(stripped.trim(), " ").to_string()
}

pub fn normalize_url(url: &str) -> String {
    url.trim().to_lowercase().trim_end_matches('/').to_string()
}

/// Comparison keys built from a store snapshot. Names and company names share
/// one key space, so a new name matching an old company name also counts.
#[derive(Debug, Default)]
pub struct ExistingIndex {
    names: HashSet<String>,
    urls: HashSet<String>,
}

impl ExistingIndex {
    pub fn new(rows: &[ExistingSettlement]) -> Self {
        let mut index = ExistingIndex::default();
        for row in rows {
            for field in [&row.name, &row.company_name].into_iter().flatten() {
                let key = normalize(field);
                if !key.is_empty() {
                    index.names.insert(key);
                }
            }
            if let Some(url) = &row.claim_url {
                let key = normalize_url(url);
                if !key.is_empty() {
                    index.urls.insert(key);
                }
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.urls.len()
    }

    pub fn matches(&self, record: &SettlementRecord) -> Option<SkipReason> {
        let known = |key: String| !key.is_empty() && self.names.contains(&key);
        if known(normalize(&record.name)) {
            return Some(SkipReason::Name);
        }
        if known(normalize(&record.company_name)) {
            return Some(SkipReason::Company);
        }
        let url = normalize_url(&record.claim_url);
        if !url.is_empty() && self.urls.contains(&url) {
            return Some(SkipReason::ClaimUrl);
        }
        None
    }
}

/// Queue for insertion only the records the snapshot does not already know.
pub fn plan_append_only(records: Vec<SettlementRecord>, existing: &ExistingIndex) -> Plan {
    let mut plan = Plan::default();
    for record in records {
        match existing.matches(&record) {
            Some(reason) => {
                debug!(slug = %record.source_id, ?reason, "already in store");
                plan.skipped.push((record, reason));
            }
            None => plan.inserts.push(record),
        }
    }
    plan
}

/// Every record goes to the store keyed on `source_id`; nothing is pre-filtered.
pub fn plan_upsert(records: Vec<SettlementRecord>) -> Plan {
    Plan {
        upserts: records,
        ..Plan::default()
    }
}
