//! Bucket naming for the weekday and month views
//!
//! Names come from chrono's localized formatting against a fixed
//! reference year, so the same [`Calendar`] always produces the same
//! names no matter what today's date is.

use chrono::{Locale, Month, NaiveDate, NaiveTime, Weekday};

use crate::types::{BucketSummary, MonthTotals, Result, StatsError, WeekdayTotals, MONTHS, WEEKDAYS};

/// Weekday names format
const WEEKDAY_FORMAT: &str = "%A";

/// Month names format
const MONTH_FORMAT: &str = "%B";

/// Reference year; 2024-01-01 is a Monday
const REFERENCE_YEAR: i32 = 2024;

/// Locale used to render bucket names
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    locale: Locale,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Locale::en_US)
    }
}

impl Calendar {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Look up a locale by POSIX name, e.g. `en_US` or `fr_FR`
    pub fn from_name(name: &str) -> Result<Self> {
        let locale = Locale::try_from(name)
            .map_err(|_| StatsError::Config(format!("Unknown locale '{}'", name)))?;
        Ok(Self::new(locale))
    }

    pub fn weekday_name(&self, weekday: Weekday) -> String {
        let monday = NaiveDate::from_isoywd_opt(REFERENCE_YEAR, 1, Weekday::Mon)
            .expect("reference week exists");
        let day = monday + chrono::Duration::days(weekday.num_days_from_monday() as i64);
        self.render(day, WEEKDAY_FORMAT)
    }

    pub fn month_name(&self, month: Month) -> String {
        let first = NaiveDate::from_ymd_opt(REFERENCE_YEAR, month.number_from_month(), 1)
            .expect("first of month exists");
        self.render(first, MONTH_FORMAT)
    }

    pub fn weekday_names(&self) -> [String; 7] {
        WEEKDAYS.map(|w| self.weekday_name(w))
    }

    pub fn month_names(&self) -> [String; 12] {
        MONTHS.map(|m| self.month_name(m))
    }

    /// All 7 weekday buckets seeded to zero
    pub fn weekly_skeleton(&self) -> BucketSummary {
        self.name_weekdays(&WeekdayTotals::default())
    }

    /// All 12 month buckets seeded to zero
    pub fn monthly_skeleton(&self) -> BucketSummary {
        self.name_months(&MonthTotals::default())
    }

    pub fn name_weekdays(&self, totals: &WeekdayTotals) -> BucketSummary {
        BucketSummary::from_entries(
            totals
                .iter()
                .map(|(w, count)| (self.weekday_name(w), count))
                .collect(),
        )
    }

    pub fn name_months(&self, totals: &MonthTotals) -> BucketSummary {
        BucketSummary::from_entries(
            totals
                .iter()
                .map(|(m, count)| (self.month_name(m), count))
                .collect(),
        )
    }

    fn render(&self, date: NaiveDate, fmt: &str) -> String {
        date.and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized(fmt, self.locale)
            .to_string()
    }
}
