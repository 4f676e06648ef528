use std::sync::LazyLock;

use regex::Regex;

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*([\d,]+)\s*[-–—]\s*\$\s*([\d,]+)").unwrap());
static UP_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Up\s+to\s+\$\s*([\d,]+)").unwrap());
static LABELED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPayout\b\s*:?\s*\$\s*([\d,]+)\s*(\+)?").unwrap());
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPayout\b\s*:?\s*(.*)").unwrap());
static NEXT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Deadline|Proof\s*Required|<?\s*\d+\s*Days?\s*Left)").unwrap()
});

/// Shown when no amount could be read from the card.
pub const VARIES: &str = "Varies";

const RAW_DISPLAY_MAX: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub display: String,
}

impl Payout {
    fn varies() -> Self {
        Self {
            min: None,
            max: None,
            display: VARIES.to_string(),
        }
    }
}

/// Read the payout bounds from a card's text.
///
/// Tried in order: `$A - $B` range, `Up to $X`, then `Payout $X` / `Payout $X+`.
/// "Up to" leaves the floor empty rather than zero.
pub fn parse(text: &str) -> Payout {
    if let Some(caps) = RANGE_RE.captures(text) {
        if let (Some(min), Some(max)) = (parse_amount(&caps[1]), parse_amount(&caps[2])) {
            return Payout {
                display: format!("{} - {}", dollars(&min.digits), dollars(&max.digits)),
                min: Some(min.value),
                max: Some(max.value),
            };
        }
    }

    if let Some(max) = UP_TO_RE.captures(text).and_then(|c| parse_amount(&c[1])) {
        return Payout {
            display: format!("Up to {}", dollars(&max.digits)),
            min: None,
            max: Some(max.value),
        };
    }

    if let Some(caps) = LABELED_RE.captures(text) {
        if let Some(val) = parse_amount(&caps[1]) {
            let open_ended = caps.get(2).is_some();
            return Payout {
                display: if open_ended {
                    format!("{}+", dollars(&val.digits))
                } else {
                    dollars(&val.digits)
                },
                min: Some(val.value),
                max: if open_ended { None } else { Some(val.value) },
            };
        }
    }

    match raw_after_label(text) {
        Some(raw) => Payout {
            min: None,
            max: None,
            display: raw,
        },
        None => Payout::varies(),
    }
}

/// A dollar amount as read, plus its bare digits for display.
struct Amount {
    value: f64,
    digits: String,
}

fn parse_amount(s: &str) -> Option<Amount> {
    let bare = s.replace(',', "");
    let value = bare.parse::<f64>().ok()?;
    let trimmed = bare.trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    Some(Amount {
        value,
        digits: digits.to_string(),
    })
}

/// Whatever follows the payout label, cut at the next known label.
fn raw_after_label(text: &str) -> Option<String> {
    let rest = LABEL_RE.captures(text)?.get(1)?.as_str();
    let end = NEXT_LABEL_RE.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    let raw: String = rest[..end].trim().chars().take(RAW_DISPLAY_MAX).collect();
    let raw = raw.trim().to_string();
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// `$12,500` style rendering of a run of ASCII digits.
pub fn dollars(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range() {
        let p = parse("Payout $100 - $10,000 Deadline 2/17/26");
        assert_eq!(p.min, Some(100.0));
        assert_eq!(p.max, Some(10000.0));
        assert_eq!(p.display, "$100 - $10,000");
    }

    #[test]
    fn range_with_en_dash() {
        let p = parse("Payout $25–$1,500");
        assert_eq!(p.min, Some(25.0));
        assert_eq!(p.max, Some(1500.0));
    }

    #[test]
    fn up_to() {
        let p = parse("Payout Up to $5,000 Deadline 3/1/2026");
        assert_eq!(p.min, None);
        assert_eq!(p.max, Some(5000.0));
        assert_eq!(p.display, "Up to $5,000");
    }

    #[test]
    fn single_amount() {
        let p = parse("Payout $250 Deadline 1/5/27");
        assert_eq!(p.min, Some(250.0));
        assert_eq!(p.max, Some(250.0));
        assert_eq!(p.display, "$250");
    }

    #[test]
    fn open_ended_amount() {
        let p = parse("Payout $1,200+ Deadline 1/5/27");
        assert_eq!(p.min, Some(1200.0));
        assert_eq!(p.max, None);
        assert_eq!(p.display, "$1,200+");
    }

    #[test]
    fn no_label_is_varies() {
        let p = parse("Some settlement with nothing to say about money");
        assert_eq!(p, Payout::varies());
    }

    #[test]
    fn unparseable_label_keeps_raw_text() {
        let p = parse("Payout Pro rata share Deadline 4/30/26");
        assert_eq!(p.min, None);
        assert_eq!(p.max, None);
        assert_eq!(p.display, "Pro rata share");
    }

    #[test]
    fn label_with_nothing_after_is_varies() {
        let p = parse("Payout Deadline 4/30/26");
        assert_eq!(p.display, VARIES);
    }

    #[test]
    fn dollars_groups_thousands() {
        assert_eq!(dollars("5"), "$5");
        assert_eq!(dollars("999"), "$999");
        assert_eq!(dollars("1000"), "$1,000");
        assert_eq!(dollars("1234567"), "$1,234,567");
    }

    #[test]
    fn huge_amount_keeps_its_digits() {
        let p = parse("Payout $12,345,678,901,234,567,890,123 Deadline 1/5/27");
        assert_eq!(p.display, "$12,345,678,901,234,567,890,123");
        assert_eq!(p.max, Some(12345678901234567890123.0));
    }

    #[test]
    fn leading_zeros_dropped_from_display() {
        assert_eq!(parse("Payout $0050").display, "$50");
        assert_eq!(parse("Payout $0").display, "$0");
    }

    #[test]
    fn plural_in_prose_is_not_the_label() {
        let p = parse("Acme Payouts depend on the number of claims filed. Payout Varies Deadline 2/17/26");
        assert_eq!(p.min, None);
        assert_eq!(p.max, None);
        assert_eq!(p.display, "Varies");
    }

    #[test]
    fn label_inside_a_word_is_ignored() {
        assert_eq!(parse("Repayouts $40 are pending").display, VARIES);
    }
}
