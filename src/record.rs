use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;
use uuid::Uuid;

use crate::classify::{Category, ClassifierRules};
use crate::clock::Clock;
use crate::parser::cards::Card;
use crate::parser::extract;
use crate::slug;

/// Whether a claim needs documentation. `Unknown` covers both a missing label
/// and an explicit "N/A".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofRequired {
    Yes,
    No,
    Unknown,
}

impl ProofRequired {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            ProofRequired::Yes => Some(true),
            ProofRequired::No => Some(false),
            ProofRequired::Unknown => None,
        }
    }
}

impl Serialize for ProofRequired {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_flag().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementRecord {
    pub id: Uuid,
    pub source_id: String,
    pub name: String,
    pub company_name: String,
    pub payout_min: Option<f64>,
    pub payout_max: Option<f64>,
    pub payout_display: String,
    pub deadline: Option<NaiveDate>,
    pub days_left: Option<i64>,
    pub requires_proof: ProofRequired,
    #[serde(rename = "description")]
    pub eligibility: Option<String>,
    pub claim_url: String,
    pub source_url: String,
    pub category: Category,
    pub case_type: Option<String>,
    pub is_major_brand: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn from_card(
        card: &Card,
        source_url: &str,
        rules: &ClassifierRules,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        let fields = extract::extract_all(&card.text, now.date_naive());
        let name = display_name(&card.name);
        let company_name = company_name(&card.name);
        let class = rules.classify(&name, &company_name);

        SettlementRecord {
            id: slug::stable_id(slug::SOURCE_DOMAIN, &card.slug),
            source_id: card.slug.clone(),
            name,
            company_name,
            payout_min: fields.payout.min,
            payout_max: fields.payout.max,
            payout_display: fields.payout.display,
            deadline: fields.deadline.date,
            days_left: fields.deadline.days_left,
            requires_proof: fields.proof,
            eligibility: fields.eligibility.map(|e| e.into_text()),
            claim_url: card.claim_url.clone(),
            source_url: source_url.to_string(),
            category: class.category,
            case_type: class.case_type,
            is_major_brand: class.is_major_brand,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Names without "Settlement" get the listing's usual suffix.
pub fn display_name(name: &str) -> String {
    let name = name.trim();
    if name.contains("Settlement") {
        name.to_string()
    } else {
        format!("{} Class Action Settlement", name)
    }
}

/// The part of the name before the first " - ".
pub fn company_name(name: &str) -> String {
    name.split(" - ").next().unwrap_or(name).trim().to_string()
}

/// Build one record per card. A slug seen earlier in the batch drops the card.
pub fn assemble(
    cards: &[Card],
    source_url: &str,
    rules: &ClassifierRules,
    clock: &dyn Clock,
) -> Vec<SettlementRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(cards.len());
    for card in cards {
        if !seen.insert(card.slug.as_str()) {
            debug!(slug = %card.slug, "dropping duplicate card");
            continue;
        }
        records.push(SettlementRecord::from_card(card, source_url, rules, clock));
    }
    records
}
