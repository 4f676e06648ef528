use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::debug;

use crate::slug;

static MARKER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-name]").unwrap());

/// One listing's raw material: its title, key, link and the text around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub name: String,
    pub slug: String,
    pub claim_url: String,
    pub text: String,
}

/// Container search window. A container is accepted when its flattened text
/// is strictly between `min_len` and `max_len` chars and holds every keyword.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    pub min_len: usize,
    pub max_len: usize,
    pub max_depth: usize,
    pub fallback_depth: usize,
    pub keywords: Vec<String>,
    /// Below this many marker cards the heading strategy also runs.
    pub min_records: usize,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            min_len: 150,
            max_len: 800,
            max_depth: 8,
            fallback_depth: 5,
            keywords: vec!["Payout".into(), "Deadline".into()],
            min_records: 3,
        }
    }
}

impl LocatorSettings {
    fn accepts(&self, text: &str, len: usize) -> bool {
        len > self.min_len
            && len < self.max_len
            && self.keywords.iter().all(|kw| text.contains(kw.as_str()))
    }
}

/// Minimal view of a document node for the container search.
pub trait TreeNode: Sized {
    fn parent_node(&self) -> Option<Self>;
    fn flat_text(&self) -> String;
}

impl TreeNode for ElementRef<'_> {
    fn parent_node(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn flat_text(&self) -> String {
        self.text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    /// Ancestor `depth` levels up passed the window and keyword test.
    Accepted { depth: usize, text: String },
    /// Nothing passed; best shallow ancestor that does not span several cards.
    Fallback { depth: usize, text: String },
    Missing,
}

impl Container {
    pub fn into_text(self) -> String {
        match self {
            Container::Accepted { text, .. } | Container::Fallback { text, .. } => text,
            Container::Missing => String::new(),
        }
    }
}

/// Walk up from `start` for at most `max_depth` ancestors looking for the
/// smallest one that holds exactly one card.
///
/// The walk stops early once an ancestor's text exceeds `max_len`. The fallback
/// is the deepest ancestor within `fallback_depth` that stayed under `max_len`,
/// else the immediate parent.
pub fn find_container<N: TreeNode>(start: &N, settings: &LocatorSettings) -> Container {
    let mut node = start.parent_node();
    let mut depth = 0;
    let mut immediate: Option<String> = None;
    let mut fallback: Option<(usize, String)> = None;

    while let Some(current) = node {
        depth += 1;
        if depth > settings.max_depth {
            break;
        }
        let text = current.flat_text();
        let len = text.chars().count();

        if settings.accepts(&text, len) {
            return Container::Accepted { depth, text };
        }
        if depth == 1 {
            immediate = Some(text.clone());
        }
        if len > settings.max_len {
            break;
        }
        if depth <= settings.fallback_depth {
            fallback = Some((depth, text));
        }
        node = current.parent_node();
    }

    match (fallback, immediate) {
        (Some((depth, text)), _) => Container::Fallback { depth, text },
        (None, Some(text)) => Container::Fallback { depth: 1, text },
        (None, None) => Container::Missing,
    }
}

/// Cards keyed off `data-name` title links. First occurrence of a slug wins.
pub fn locate_marked(doc: &Html, base: &Url, settings: &LocatorSettings) -> Vec<Card> {
    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    let mut fallbacks = 0usize;

    for el in doc.select(&MARKER_SELECTOR) {
        let attrs = el.value();
        let name = attrs.attr("data-name").unwrap_or_default().trim();
        let href = attrs.attr("href").unwrap_or_default().trim();
        if name.is_empty() || href.is_empty() {
            continue;
        }

        let slug = slug::resolve(attrs.attr("data-slug"), name);
        if slug.is_empty() || seen.contains(&slug) {
            continue;
        }
        let Some(claim_url) = absolute_url(base, href) else {
            debug!(slug = %slug, href, "skipping card with unusable link");
            continue;
        };

        let container = find_container(&el, settings);
        if !matches!(container, Container::Accepted { .. }) {
            fallbacks += 1;
            debug!(slug = %slug, ?container, "no clean container");
        }

        seen.insert(slug.clone());
        cards.push(Card {
            name: name.to_string(),
            slug,
            claim_url,
            text: container.into_text(),
        });
    }

    debug!(cards = cards.len(), fallbacks, "marker strategy done");
    cards
}

pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A straight ancestor chain: index 0 is the title, each next index its parent.
    struct Chain<'a> {
        texts: &'a [String],
        idx: usize,
    }

    impl TreeNode for Chain<'_> {
        fn parent_node(&self) -> Option<Self> {
            (self.idx + 1 < self.texts.len()).then(|| Chain {
                texts: self.texts,
                idx: self.idx + 1,
            })
        }

        fn flat_text(&self) -> String {
            self.texts[self.idx].clone()
        }
    }

    fn sized(len: usize, keywords: bool) -> String {
        let head = if keywords { "Payout $5 Deadline 1/1/27 " } else { "" };
        let mut s = head.to_string();
        while s.chars().count() < len {
            s.push('x');
        }
        s
    }

    fn search(texts: &[String]) -> Container {
        find_container(&Chain { texts, idx: 0 }, &LocatorSettings::default())
    }

    #[test]
    fn too_short_is_rejected_then_next_level_accepted() {
        let texts = vec!["Title".to_string(), sized(140, true), sized(300, true)];
        assert!(matches!(search(&texts), Container::Accepted { depth: 2, .. }));
    }

    #[test]
    fn window_with_keywords_is_accepted() {
        let texts = vec!["Title".to_string(), sized(300, true)];
        assert_eq!(
            search(&texts),
            Container::Accepted { depth: 1, text: sized(300, true) }
        );
    }

    #[test]
    fn too_long_falls_back_to_shallower_ancestor() {
        let texts = vec!["Title".to_string(), sized(140, true), sized(900, true)];
        assert_eq!(
            search(&texts),
            Container::Fallback { depth: 1, text: sized(140, true) }
        );
    }

    #[test]
    fn missing_keywords_falls_back_to_deepest_under_limit() {
        let texts = vec![
            "Title".to_string(),
            sized(300, false),
            sized(500, false),
            sized(900, false),
        ];
        assert!(matches!(search(&texts), Container::Fallback { depth: 2, .. }));
    }

    #[test]
    fn overflowing_parent_is_still_used() {
        let texts = vec!["Title".to_string(), sized(900, true)];
        assert!(matches!(search(&texts), Container::Fallback { depth: 1, .. }));
    }

    #[test]
    fn fallback_is_bounded_by_depth() {
        let mut texts = vec!["Title".to_string()];
        for _ in 0..7 {
            texts.push(sized(200, false));
        }
        assert!(matches!(search(&texts), Container::Fallback { depth: 5, .. }));
    }

    #[test]
    fn orphan_title_has_no_container() {
        let texts = vec!["Title".to_string()];
        assert_eq!(search(&texts), Container::Missing);
    }

    #[test]
    fn fixture_cards() {
        let html = std::fs::read_to_string("tests/fixtures/listing.html").unwrap();
        let doc = Html::parse_document(&html);
        let base = Url::parse("https://www.classaction.org/settlements").unwrap();
        let cards = locate_marked(&doc, &base, &LocatorSettings::default());

        let slugs: Vec<&str> = cards.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(
            slugs,
            ["acme-corp-data-breach", "harbor-bank-overdraft-fees", "peloton-tread", "glowup-cosmetics"]
        );

        // Duplicate marker for Acme appears later with a different payout.
        assert!(cards[0].text.contains("$100 - $10,000"));
        assert!(!cards[0].text.contains("Harbor"));

        // Relative link resolved against the listing page.
        assert_eq!(
            cards[2].claim_url,
            "https://www.classaction.org/settlements/peloton-tread"
        );

        // Card without a deadline label still gets its own text.
        assert!(cards[3].text.contains("GlowUp"));
        assert!(!cards[3].text.contains("Peloton"));
    }

    #[test]
    fn absolute_urls() {
        let base = Url::parse("https://www.classaction.org/settlements").unwrap();
        assert_eq!(
            absolute_url(&base, "https://claims.example.com/x").as_deref(),
            Some("https://claims.example.com/x")
        );
        assert_eq!(
            absolute_url(&base, "/news/abc").as_deref(),
            Some("https://www.classaction.org/news/abc")
        );
        assert_eq!(absolute_url(&base, "mailto:someone@example.com"), None);
    }
}
