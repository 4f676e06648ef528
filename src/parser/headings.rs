use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::cards::{absolute_url, Card, TreeNode};
use crate::slug;

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static MARKER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-name]").unwrap());

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Cards for pages without title markers: each heading holding an off-site
/// link starts a card that runs until the next heading among its siblings.
/// Headings that carry a title marker belong to the marker strategy.
pub fn locate_by_headings(doc: &Html, base: &Url) -> Vec<Card> {
    let mut seen = HashSet::new();
    let mut cards = Vec::new();

    for heading in doc.select(&HEADING_SELECTOR) {
        if heading.select(&MARKER_SELECTOR).next().is_some() {
            continue;
        }
        let Some((link, claim_url)) = heading.select(&LINK_SELECTOR).find_map(|a| {
            let href = a.value().attr("href")?;
            external_url(base, href).map(|url| (a, url))
        }) else {
            continue;
        };

        let link_text = link.flat_text();
        let name = if link_text.is_empty() {
            heading.flat_text()
        } else {
            link_text
        };
        if name.is_empty() {
            continue;
        }

        let slug = slug::resolve(link.value().attr("data-slug"), &name);
        if slug.is_empty() || !seen.insert(slug.clone()) {
            continue;
        }

        cards.push(Card {
            name,
            slug,
            claim_url,
            text: block_text(heading),
        });
    }

    debug!(cards = cards.len(), "heading strategy done");
    cards
}

/// Heading text plus every following sibling up to the next heading.
fn block_text(heading: ElementRef) -> String {
    let mut parts = vec![heading.flat_text()];
    for sibling in heading.next_siblings() {
        if let Some(el) = ElementRef::wrap(sibling) {
            if is_heading(el) {
                break;
            }
            parts.push(el.flat_text());
        } else if let Some(text) = sibling.value().as_text() {
            parts.push(text.trim().to_string());
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn is_heading(el: ElementRef) -> bool {
    HEADING_TAGS.contains(&el.value().name())
}

/// Absolute URL for `href` when it points off the listing's own site.
fn external_url(base: &Url, href: &str) -> Option<String> {
    let url = absolute_url(base, href)?;
    let host = Url::parse(&url).ok()?.host_str().map(bare_host)?;
    let own = base.host_str().map(bare_host).unwrap_or_default();
    (host != own).then_some(url)
}

fn bare_host(host: &str) -> String {
    host.trim_start_matches("www.").to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.classaction.org/settlements").unwrap()
    }

    #[test]
    fn external_only() {
        assert!(external_url(&base(), "https://claims.example.com").is_some());
        assert!(external_url(&base(), "https://classaction.org/news").is_none());
        assert!(external_url(&base(), "/settlements/acme").is_none());
    }

    #[test]
    fn fixture_headings() {
        let html = std::fs::read_to_string("tests/fixtures/headings.html").unwrap();
        let doc = Html::parse_document(&html);
        let cards = locate_by_headings(&doc, &base());

        let slugs: Vec<&str> = cards.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["brightsmile-dental-data-breach", "northway-credit-union-fees"]);

        let first = &cards[0];
        assert_eq!(first.claim_url, "https://brightsmilesettlement.com/");
        assert!(first.text.contains("Payout Up to $2,500"));
        assert!(!first.text.contains("Northway"));

        // Runs to the end of the parent when no heading follows.
        assert!(cards[1].text.contains("Proof Required? Yes"));
    }

    #[test]
    fn marked_headings_and_all_levels() {
        let doc = Html::parse_document(
            "<html><body>\
             <h3><a href=\"https://acme.example.com\" data-name=\"Acme\">Acme Settlement</a></h3>\
             <p>Payout $5</p>\
             <h5><a href=\"https://widget.example.com\">Widget Refunds</a></h5>\
             <p>Payout $9</p>\
             </body></html>",
        );
        let cards = locate_by_headings(&doc, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].slug, "widget-refunds");
        assert_eq!(cards[0].text, "Widget Refunds Payout $9");
    }

    #[test]
    fn headings_without_external_links_are_ignored() {
        let doc = Html::parse_document(
            "<html><body><h2><a href=\"/about\">About us</a></h2><p>Payout $5</p></body></html>",
        );
        assert!(locate_by_headings(&doc, &base()).is_empty());
    }
}
