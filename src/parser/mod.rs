pub mod cards;
pub mod extract;
pub mod headings;

use reqwest::Url;
use scraper::Html;
use tracing::{debug, info};

use crate::classify::ClassifierRules;
use crate::clock::Clock;
use crate::reconcile::normalize_url;
use crate::record::{self, SettlementRecord};
use cards::{Card, LocatorSettings};

/// Marker cards first; heading cards are appended when markers come up short.
pub fn locate_cards(html: &str, base: &Url, settings: &LocatorSettings) -> Vec<Card> {
    let doc = Html::parse_document(html);
    let mut found = cards::locate_marked(&doc, base, settings);
    info!(cards = found.len(), "located marker cards");

    if found.len() < settings.min_records {
        let extra = headings::locate_by_headings(&doc, base);
        let before = found.len();
        for card in extra {
            let url = normalize_url(&card.claim_url);
            let known = found
                .iter()
                .any(|c| c.slug == card.slug || normalize_url(&c.claim_url) == url);
            if known {
                debug!(slug = %card.slug, "heading card already located");
                continue;
            }
            found.push(card);
        }
        info!(cards = found.len() - before, "located heading cards");
    }
    found
}

/// Document → cards → records.
pub fn process_document(
    html: &str,
    source_url: &Url,
    settings: &LocatorSettings,
    rules: &ClassifierRules,
    clock: &dyn Clock,
) -> Vec<SettlementRecord> {
    let found = locate_cards(html, source_url, settings);
    record::assemble(&found, source_url.as_str(), rules, clock)
}
