use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]").unwrap());

static QUALIFIER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bYou may be (?:included|covered|eligible|able)\b",
        r"(?i)\bThis settlement covers\b",
        r"(?i)\bIf you .+?(?:you may|this settlement)\b",
        r"(?i)\bClass members are\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const EXCERPT_MIN_TEXT: usize = 200;
const EXCERPT_LEN: usize = 200;

/// Who qualifies, either quoted from the card or a raw excerpt of it.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    Matched(String),
    Excerpt(String),
}

impl Eligibility {
    pub fn into_text(self) -> String {
        match self {
            Eligibility::Matched(s) | Eligibility::Excerpt(s) => s,
        }
    }
}

pub fn parse(text: &str) -> Option<Eligibility> {
    for sentence in SENTENCE_RE.find_iter(text) {
        let sentence = sentence.as_str();
        let hit = QUALIFIER_RES
            .iter()
            .filter_map(|re| re.find(sentence))
            .min_by_key(|m| m.start());
        if let Some(m) = hit {
            return Some(Eligibility::Matched(sentence[m.start()..].trim().to_string()));
        }
    }

    let text = text.trim();
    if text.chars().count() > EXCERPT_MIN_TEXT {
        let prefix: String = text.chars().take(EXCERPT_LEN).collect();
        return Some(Eligibility::Excerpt(format!("{}...", prefix.trim_end())));
    }
    None
}
