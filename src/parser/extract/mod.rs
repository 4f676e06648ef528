pub mod deadline;
pub mod eligibility;
pub mod payout;
pub mod proof;

use chrono::NaiveDate;

use crate::record::ProofRequired;
use deadline::Deadline;
use eligibility::Eligibility;
use payout::Payout;

/// Every field read from one card's text. Each parser is independent and a
/// miss leaves its field empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFields {
    pub payout: Payout,
    pub deadline: Deadline,
    pub proof: ProofRequired,
    pub eligibility: Option<Eligibility>,
}

pub fn extract_all(text: &str, today: NaiveDate) -> CardFields {
    CardFields {
        payout: payout::parse(text),
        deadline: deadline::parse(text, today),
        proof: proof::parse(text),
        eligibility: eligibility::parse(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_card() {
        let text = "Acme Corp - Data Breach Payout $100 - $10,000 Deadline 2/17/26 \
                    Proof Required? No You may be covered if you had an Acme account.";
        let today = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        let f = extract_all(text, today);
        assert_eq!(f.payout.display, "$100 - $10,000");
        assert_eq!(f.deadline.date, NaiveDate::from_ymd_opt(2026, 2, 17));
        assert_eq!(f.deadline.days_left, Some(10));
        assert_eq!(f.proof, ProofRequired::No);
        assert!(matches!(f.eligibility, Some(Eligibility::Matched(ref s)) if s.starts_with("You may be covered")));
    }

    #[test]
    fn empty_card_misses_everything() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let f = extract_all("", today);
        assert_eq!(f.payout.display, payout::VARIES);
        assert_eq!(f.deadline.date, None);
        assert_eq!(f.deadline.days_left, None);
        assert_eq!(f.proof, ProofRequired::Unknown);
        assert_eq!(f.eligibility, None);
    }
}
