use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Deadline\s*:?\s*(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b").unwrap()
});
static DAYS_LEFT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<?\s*(\d+)\s*Days?\s*Left").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Deadline {
    pub date: Option<NaiveDate>,
    pub days_left: Option<i64>,
}

/// Read the claim deadline and the days remaining.
///
/// An explicit "N Days Left" wins; otherwise the count is derived from the
/// parsed date against `today`, floored at zero. The two are not cross-checked.
pub fn parse(text: &str, today: NaiveDate) -> Deadline {
    let date = DEADLINE_RE.captures(text).and_then(|caps| {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        let year = expand_year(&caps[3])?;
        NaiveDate::from_ymd_opt(year, month, day)
    });

    let days_left = DAYS_LEFT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .or_else(|| date.map(|d| (d - today).num_days().max(0)));

    Deadline { date, days_left }
}

/// Two-digit years pivot at 69: `69..=99` are 19xx, `00..=68` are 20xx.
fn expand_year(raw: &str) -> Option<i32> {
    let n: i32 = raw.parse().ok()?;
    if raw.len() == 4 {
        Some(n)
    } else if n >= 69 {
        Some(1900 + n)
    } else {
        Some(2000 + n)
    }
}
