use std::sync::LazyLock;

use regex::Regex;

use crate::record::ProofRequired;

static PROOF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Proof\s*Required\?\s*(Yes|No|N/?A)\b").unwrap());

/// `Proof Required? Yes|No|N/A`. A missing label and `N/A` both read as unknown.
pub fn parse(text: &str) -> ProofRequired {
    let Some(caps) = PROOF_RE.captures(text) else {
        return ProofRequired::Unknown;
    };
    match caps[1].to_ascii_lowercase().as_str() {
        "yes" => ProofRequired::Yes,
        "no" => ProofRequired::No,
        _ => ProofRequired::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_and_no() {
        assert_eq!(parse("Proof Required? Yes"), ProofRequired::Yes);
        assert_eq!(parse("Deadline 2/1/26 Proof Required? No Payout"), ProofRequired::No);
        assert_eq!(parse("proof required?no"), ProofRequired::No);
    }

    #[test]
    fn not_applicable_is_unknown() {
        assert_eq!(parse("Proof Required? N/A"), ProofRequired::Unknown);
        assert_eq!(parse("Proof Required? NA"), ProofRequired::Unknown);
    }

    #[test]
    fn absent_is_unknown_not_false() {
        let p = parse("Payout $20 Deadline 2/1/26");
        assert_eq!(p, ProofRequired::Unknown);
        assert_ne!(p, ProofRequired::No);
        assert_eq!(p.as_flag(), None);
    }

    #[test]
    fn word_boundary() {
        // "Nothing" must not read as "No"
        assert_eq!(parse("Proof Required? Nothing listed"), ProofRequired::Unknown);
    }
}
