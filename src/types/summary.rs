//! Summary types: the daily, weekday and monthly views and their records

use chrono::{Month, NaiveDate, NaiveDateTime, Weekday};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Second-precision timestamp format used in records and documents
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Weekdays in bucket order (ISO, Monday first)
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Months in bucket order
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// serde adapter for [`TIMESTAMP_FORMAT`]
pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Sparse per-day counts, ascending by date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DailySummary(BTreeMap<NaiveDate, u64>);

impl DailySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<u64> {
        self.0.get(&date).copied()
    }

    pub fn insert(&mut self, date: NaiveDate, count: u64) {
        self.0.insert(date, count);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.0.iter().map(|(d, c)| (*d, *c))
    }

    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, c| acc.saturating_add(*c))
    }
}

impl FromIterator<(NaiveDate, u64)> for DailySummary {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Counts accumulated per weekday, indexed Monday..Sunday
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayTotals([u64; 7]);

impl WeekdayTotals {
    pub fn add(&mut self, weekday: Weekday, count: u64) {
        let slot = &mut self.0[weekday.num_days_from_monday() as usize];
        *slot = slot.saturating_add(count);
    }

    pub fn get(&self, weekday: Weekday) -> u64 {
        self.0[weekday.num_days_from_monday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u64)> + '_ {
        WEEKDAYS.iter().copied().zip(self.0.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, c| acc.saturating_add(*c))
    }
}

/// Counts accumulated per month of year, indexed January..December
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthTotals([u64; 12]);

impl MonthTotals {
    pub fn add(&mut self, month: Month, count: u64) {
        let slot = &mut self.0[month.number_from_month() as usize - 1];
        *slot = slot.saturating_add(count);
    }

    pub fn get(&self, month: Month) -> u64 {
        self.0[month.number_from_month() as usize - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, u64)> + '_ {
        MONTHS.iter().copied().zip(self.0.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, c| acc.saturating_add(*c))
    }
}

/// Dense, named buckets in calendar order.
///
/// Serializes as a JSON object whose key order follows the calendar,
/// and deserializes keeping document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSummary {
    entries: Vec<(String, u64)>,
}

impl BucketSummary {
    pub fn from_entries(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, c)| acc.saturating_add(*c))
    }
}

impl Serialize for BucketSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BucketSummary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BucketVisitor;

        impl<'de> Visitor<'de> for BucketVisitor {
            type Value = BucketSummary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of bucket names to counts")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    entries.push((name, count));
                }
                Ok(BucketSummary { entries })
            }
        }

        deserializer.deserialize_map(BucketVisitor)
    }
}

/// Payload of a summary record: a sparse daily view or dense named buckets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Contributions {
    Daily(DailySummary),
    Buckets(BucketSummary),
}

impl Contributions {
    pub fn total(&self) -> u64 {
        match self {
            Self::Daily(d) => d.total(),
            Self::Buckets(b) => b.total(),
        }
    }
}

/// A freshly built, never-mutated summary for one identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryRecord {
    pub contributions: Contributions,
    pub username: String,
    #[serde(with = "timestamp")]
    pub last_updated: NaiveDateTime,
}

/// All three views of one observation set; the fields written on upsert
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContributionViews {
    pub daily: DailySummary,
    pub weekly: BucketSummary,
    pub monthly: BucketSummary,
}

/// Stored per-identity document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedUserDocument {
    pub username: String,
    pub daily: DailySummary,
    pub weekly: BucketSummary,
    pub monthly: BucketSummary,
    #[serde(with = "timestamp")]
    pub insertion_date: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub last_updated: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========== DailySummary ==========

    #[test]
    fn test_daily_summary_serializes_ascending_iso_keys() {
        let summary: DailySummary = vec![(date(2024, 3, 8), 3), (date(2024, 3, 1), 5)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"2024-03-01":5,"2024-03-08":3}"#);
    }

    #[test]
    fn test_daily_summary_deserializes() {
        let summary: DailySummary = serde_json::from_str(r#"{"2024-01-02":4}"#).unwrap();
        assert_eq!(summary.get(date(2024, 1, 2)), Some(4));
        assert_eq!(summary.total(), 4);
    }

    // ========== Totals ==========

    #[test]
    fn test_weekday_totals_add_and_get() {
        let mut totals = WeekdayTotals::default();
        totals.add(Weekday::Fri, 5);
        totals.add(Weekday::Fri, 3);
        totals.add(Weekday::Mon, 1);
        assert_eq!(totals.get(Weekday::Fri), 8);
        assert_eq!(totals.get(Weekday::Mon), 1);
        assert_eq!(totals.get(Weekday::Sun), 0);
        assert_eq!(totals.total(), 9);
        assert_eq!(totals.iter().count(), 7);
        assert_eq!(totals.iter().next(), Some((Weekday::Mon, 1)));
    }

    #[test]
    fn test_month_totals_saturates() {
        let mut totals = MonthTotals::default();
        totals.add(Month::December, u64::MAX);
        totals.add(Month::December, 1);
        assert_eq!(totals.get(Month::December), u64::MAX);
        assert_eq!(totals.iter().last(), Some((Month::December, u64::MAX)));
    }

    // ========== BucketSummary ==========

    #[test]
    fn test_bucket_summary_preserves_order_on_serialize() {
        let buckets = BucketSummary::from_entries(vec![
            ("Monday".into(), 2),
            ("Tuesday".into(), 0),
            ("Wednesday".into(), 7),
        ]);
        let json = serde_json::to_string(&buckets).unwrap();
        assert_eq!(json, r#"{"Monday":2,"Tuesday":0,"Wednesday":7}"#);
    }

    #[test]
    fn test_bucket_summary_preserves_document_order_on_deserialize() {
        let buckets: BucketSummary =
            serde_json::from_str(r#"{"Sunday":1,"Monday":2,"Saturday":3}"#).unwrap();
        let names: Vec<&str> = buckets.names().collect();
        assert_eq!(names, vec!["Sunday", "Monday", "Saturday"]);
        assert_eq!(buckets.get("Saturday"), Some(3));
        assert_eq!(buckets.get("Friday"), None);
    }

    // ========== Records ==========

    #[test]
    fn test_summary_record_shape() {
        let record = SummaryRecord {
            contributions: Contributions::Buckets(BucketSummary::from_entries(vec![(
                "January".into(),
                15,
            )])),
            username: "octocat".into(),
            last_updated: date(2024, 6, 15).and_hms_opt(9, 30, 5).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["username"], "octocat");
        assert_eq!(value["last_updated"], "2024-06-15 09:30:05");
        assert_eq!(value["contributions"]["January"], 15);
    }

    #[test]
    fn test_contributions_untagged_picks_daily_for_date_keys() {
        let daily: Contributions = serde_json::from_str(r#"{"2024-06-15":0}"#).unwrap();
        assert!(matches!(daily, Contributions::Daily(_)));

        let buckets: Contributions = serde_json::from_str(r#"{"Monday":3}"#).unwrap();
        assert!(matches!(buckets, Contributions::Buckets(_)));
        assert_eq!(buckets.total(), 3);
    }

    #[test]
    fn test_persisted_document_deserialize() {
        let json = r#"{
            "username": "octocat",
            "daily": {"2024-01-15": 10},
            "weekly": {"Monday": 10},
            "monthly": {"January": 10},
            "insertion_date": "2024-01-16 08:00:00",
            "last_updated": "2024-01-17 08:00:00"
        }"#;
        let doc: PersistedUserDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.username, "octocat");
        assert_eq!(doc.daily.get(date(2024, 1, 15)), Some(10));
        assert!(doc.last_updated > doc.insertion_date);
    }

    #[test]
    fn test_timestamp_rejects_rfc3339() {
        let json = r#"{
            "contributions": {},
            "username": "x",
            "last_updated": "2024-01-17T08:00:00Z"
        }"#;
        assert!(serde_json::from_str::<SummaryRecord>(json).is_err());
    }
}
