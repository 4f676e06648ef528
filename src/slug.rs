use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*-?\s*class action(?: lawsuit)?(?: settlement)?\s*$").unwrap()
});
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Domain the stable identifiers are namespaced under.
pub const SOURCE_DOMAIN: &str = "classaction.org";

/// Lowercase, hyphen-separated token for a settlement name.
pub fn canonicalize(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stripped = SUFFIX_RE.replace(&lower, "");
    let spaced = stripped.replace('&', "and");
    let collapsed = WS_RE.replace_all(spaced.trim(), " ");
    let hyphenated = collapsed.replace(" - ", "-").replace(' ', "-");
    let cleaned: String = hyphenated
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    HYPHENS_RE
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// An explicit slug from the page wins over one derived from the name.
pub fn resolve(explicit: Option<&str>, name: &str) -> String {
    match explicit.map(|s| s.trim().to_lowercase()) {
        Some(s) if !s.is_empty() => s,
        _ => canonicalize(name),
    }
}

/// Name-based (v5) identifier for `<domain>/<slug>`.
pub fn stable_id(domain: &str, slug: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, format!("{}/{}", domain, slug).as_bytes())
}
