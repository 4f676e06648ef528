use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for extraction. Day counts and record timestamps read it.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Pinned clock for tests.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        use chrono::TimeZone;
        Self(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
