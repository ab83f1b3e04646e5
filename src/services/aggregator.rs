//! Aggregator service for re-bucketing contribution observations

use crate::services::Calendar;
use crate::types::{
    BucketSummary, ContributionViews, DailySummary, MonthTotals, Observation, WeekdayTotals,
};
use chrono::{Datelike, Month, NaiveDate};
use std::collections::HashMap;

/// Aggregator for computing contribution views
pub struct Aggregator;

impl Aggregator {
    /// Aggregate observations by day (sorted by date ascending).
    /// Duplicate dates are summed; days totalling zero are dropped.
    pub fn daily(observations: &[Observation]) -> DailySummary {
        if observations.is_empty() {
            return DailySummary::new();
        }

        Self::sum_by_date(observations)
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .collect()
    }

    /// Single-entry view for `today`, zero when nothing was recorded that day
    pub fn today(observations: &[Observation], today: NaiveDate) -> DailySummary {
        let count = observations
            .iter()
            .filter(|o| o.date == today)
            .fold(0u64, |acc, o| acc.saturating_add(o.count));

        let mut summary = DailySummary::new();
        summary.insert(today, count);
        summary
    }

    /// Daily view, optionally narrowed to `today`
    pub fn daily_view(
        observations: &[Observation],
        today_only: bool,
        today: NaiveDate,
    ) -> DailySummary {
        if today_only {
            Self::today(observations, today)
        } else {
            Self::daily(observations)
        }
    }

    /// Sum counts per weekday across every year present
    pub fn weekday_totals(observations: &[Observation]) -> WeekdayTotals {
        let mut totals = WeekdayTotals::default();
        for obs in observations {
            totals.add(obs.date.weekday(), obs.count);
        }
        totals
    }

    /// Sum counts per month of year; all Januaries land in one bucket
    pub fn month_totals(observations: &[Observation]) -> MonthTotals {
        let mut totals = MonthTotals::default();
        for obs in observations {
            // month() is always 1..=12
            if let Ok(month) = Month::try_from(obs.date.month() as u8) {
                totals.add(month, obs.count);
            }
        }
        totals
    }

    /// Dense weekday view, all 7 buckets present
    pub fn weekly(observations: &[Observation], calendar: &Calendar) -> BucketSummary {
        calendar.name_weekdays(&Self::weekday_totals(observations))
    }

    /// Dense month view, all 12 buckets present
    pub fn monthly(observations: &[Observation], calendar: &Calendar) -> BucketSummary {
        calendar.name_months(&Self::month_totals(observations))
    }

    /// Compute all three views at once
    pub fn views(observations: &[Observation], calendar: &Calendar) -> ContributionViews {
        ContributionViews {
            daily: Self::daily(observations),
            weekly: Self::weekly(observations, calendar),
            monthly: Self::monthly(observations, calendar),
        }
    }

    fn sum_by_date(observations: &[Observation]) -> HashMap<NaiveDate, u64> {
        let mut by_date: HashMap<NaiveDate, u64> = HashMap::with_capacity(observations.len());
        for obs in observations {
            let slot = by_date.entry(obs.date).or_insert(0);
            *slot = slot.saturating_add(obs.count);
        }
        by_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(year: i32, month: u32, day: u32, count: u64) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(year, month, day).unwrap(), count)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // ========== daily() tests ==========

    #[test]
    fn test_daily_empty_observations() {
        let result = Aggregator::daily(&[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_daily_sorted_ascending() {
        let observations = vec![obs(2024, 1, 20, 1), obs(2024, 1, 10, 2), obs(2024, 1, 15, 3)];

        let result = Aggregator::daily(&observations);

        let dates: Vec<String> = result.iter().map(|(d, _)| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-10", "2024-01-15", "2024-01-20"]);
    }

    #[test]
    fn test_daily_drops_zero_days() {
        let observations = vec![obs(2024, 1, 10, 0), obs(2024, 1, 11, 4), obs(2024, 1, 12, 0)];

        let result = Aggregator::daily(&observations);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(date(2024, 1, 11)), Some(4));
        assert_eq!(result.get(date(2024, 1, 10)), None);
    }

    #[test]
    fn test_daily_duplicate_dates_are_summed() {
        let observations = vec![obs(2024, 1, 10, 2), obs(2024, 1, 10, 3)];

        let result = Aggregator::daily(&observations);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(date(2024, 1, 10)), Some(5));
    }

    #[test]
    fn test_daily_order_independent() {
        let forward = vec![obs(2024, 2, 1, 1), obs(2024, 2, 2, 2), obs(2024, 2, 3, 3)];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(Aggregator::daily(&forward), Aggregator::daily(&reversed));
        assert_eq!(Aggregator::daily(&forward), Aggregator::daily(&forward));
    }

    // ========== today() tests ==========

    #[test]
    fn test_today_empty_is_single_zero() {
        let today = date(2024, 6, 15);
        let result = Aggregator::today(&[], today);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(today), Some(0));
    }

    #[test]
    fn test_today_uses_injected_date_not_dataset_max() {
        let observations = vec![obs(2024, 6, 13, 4), obs(2024, 6, 14, 9)];
        let today = date(2024, 6, 15);

        let result = Aggregator::today(&observations, today);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(today), Some(0));
    }

    #[test]
    fn test_today_with_recorded_count() {
        let observations = vec![obs(2024, 6, 14, 9), obs(2024, 6, 15, 6)];

        let result = Aggregator::today(&observations, date(2024, 6, 15));

        assert_eq!(result.get(date(2024, 6, 15)), Some(6));
    }

    #[test]
    fn test_daily_view_dispatch() {
        let observations = vec![obs(2024, 6, 14, 9), obs(2024, 6, 15, 6)];
        let today = date(2024, 6, 15);

        assert_eq!(Aggregator::daily_view(&observations, false, today).len(), 2);
        assert_eq!(Aggregator::daily_view(&observations, true, today).len(), 1);
    }

    // ========== weekly() tests ==========

    #[test]
    fn test_weekly_two_fridays() {
        let observations = vec![obs(2024, 3, 1, 5), obs(2024, 3, 8, 3)];

        let result = Aggregator::weekly(&observations, &Calendar::default());

        assert_eq!(result.len(), 7);
        assert_eq!(result.get("Friday"), Some(8));
        for name in ["Monday", "Tuesday", "Wednesday", "Thursday", "Saturday", "Sunday"] {
            assert_eq!(result.get(name), Some(0), "{name} should be zero");
        }
    }

    #[test]
    fn test_weekly_empty_has_all_buckets() {
        let result = Aggregator::weekly(&[], &Calendar::default());
        assert_eq!(result.len(), 7);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_weekly_collapses_years() {
        // 2023-01-02 and 2024-01-01 are both Mondays
        let observations = vec![obs(2023, 1, 2, 4), obs(2024, 1, 1, 6)];

        let result = Aggregator::weekly(&observations, &Calendar::default());

        assert_eq!(result.get("Monday"), Some(10));
    }

    // ========== monthly() tests ==========

    #[test]
    fn test_monthly_cross_year_accumulation() {
        let observations = vec![obs(2024, 1, 15, 10), obs(2023, 1, 20, 5)];

        let result = Aggregator::monthly(&observations, &Calendar::default());

        assert_eq!(result.len(), 12);
        assert_eq!(result.get("January"), Some(15));
        assert_eq!(result.get("February"), Some(0));
    }

    #[test]
    fn test_monthly_empty_has_all_buckets() {
        let result = Aggregator::monthly(&[], &Calendar::default());
        assert_eq!(result.len(), 12);
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_monthly_localized_keys() {
        let calendar = Calendar::from_name("de_DE").unwrap();
        let result = Aggregator::monthly(&[obs(2024, 3, 1, 2)], &calendar);
        assert_eq!(result.get("März"), Some(2));
    }

    // ========== conservation ==========

    #[test]
    fn test_totals_conserved_across_views() {
        let observations = vec![
            obs(2023, 12, 31, 7),
            obs(2024, 1, 1, 0),
            obs(2024, 2, 29, 3),
            obs(2024, 7, 4, 11),
            obs(2024, 11, 30, 2),
        ];
        let calendar = Calendar::default();

        let views = Aggregator::views(&observations, &calendar);

        assert_eq!(views.daily.total(), 23);
        assert_eq!(views.weekly.total(), 23);
        assert_eq!(views.monthly.total(), 23);
    }

    #[test]
    fn test_totals_conserved_with_duplicates() {
        let observations = vec![obs(2024, 5, 5, 2), obs(2024, 5, 5, 3), obs(2024, 5, 6, 1)];
        let views = Aggregator::views(&observations, &Calendar::default());

        assert_eq!(views.daily.total(), 6);
        assert_eq!(views.weekly.total(), 6);
        assert_eq!(views.monthly.total(), 6);
    }
}
