use std::collections::HashMap;

use chrono::NaiveDate;

use crate::store::entities::SessionRecord;

/// Hours summed per (day, activity), with the orderings the chart needs:
/// days ascend, activities keep first-appearance order so segment colors and
/// the legend stay stable.
pub struct DailyTotals {
    dates: Vec<NaiveDate>,
    activities: Vec<String>,
    totals: HashMap<(NaiveDate, String), f64>,
}

impl DailyTotals {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    /// Missing combinations are zero.
    pub fn hours(&self, date: NaiveDate, activity: &str) -> f64 {
        self.totals
            .get(&(date, activity.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Tallest stacked bar, used to scale the y-axis.
    pub fn max_stacked_hours(&self) -> f64 {
        self.dates
            .iter()
            .map(|date| {
                self.activities
                    .iter()
                    .map(|activity| self.hours(*date, activity))
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Single pass over the records: group by the start timestamp's calendar day
/// and the activity name, summing stored durations.
pub fn summarize_by_day(records: &[SessionRecord]) -> DailyTotals {
    let mut totals = HashMap::<(NaiveDate, String), f64>::new();
    let mut dates = Vec::new();
    let mut activities = Vec::<String>::new();

    for record in records {
        let date = record.start_date();
        if !dates.contains(&date) {
            dates.push(date);
        }
        if !activities.iter().any(|v| *v == record.activity) {
            activities.push(record.activity.clone());
        }
        *totals.entry((date, record.activity.clone())).or_default() += record.duration_hours;
    }

    dates.sort();

    DailyTotals {
        dates,
        activities,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::summarize_by_day;
    use crate::report::test_support::record;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sums_hours_per_day_and_activity() {
        let records = vec![
            record("Study", (2024, 1, 1), (9, 0, 0), 1.5),
            record("Study", (2024, 1, 1), (14, 0, 0), 0.5),
            record("Game", (2024, 1, 1), (20, 0, 0), 2.0),
        ];

        let totals = summarize_by_day(&records);
        assert!((totals.hours(day(2024, 1, 1), "Study") - 2.0).abs() < 1e-9);
        assert!((totals.hours(day(2024, 1, 1), "Game") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_combinations_are_zero() {
        let records = vec![record("Study", (2024, 1, 1), (9, 0, 0), 1.0)];
        let totals = summarize_by_day(&records);
        assert_eq!(totals.hours(day(2024, 1, 1), "Game"), 0.0);
        assert_eq!(totals.hours(day(2024, 1, 2), "Study"), 0.0);
    }

    #[test]
    fn dates_ascend_regardless_of_store_order() {
        let records = vec![
            record("Study", (2024, 1, 3), (9, 0, 0), 1.0),
            record("Study", (2024, 1, 1), (9, 0, 0), 1.0),
            record("Study", (2024, 1, 2), (9, 0, 0), 1.0),
        ];

        let totals = summarize_by_day(&records);
        assert_eq!(
            totals.dates(),
            &[day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]
        );
    }

    #[test]
    fn activities_keep_first_appearance_order() {
        let records = vec![
            record("Game", (2024, 1, 1), (9, 0, 0), 1.0),
            record("Study", (2024, 1, 1), (11, 0, 0), 1.0),
            record("Game", (2024, 1, 2), (9, 0, 0), 1.0),
        ];

        let totals = summarize_by_day(&records);
        assert_eq!(totals.activities(), &["Game".to_string(), "Study".into()]);
    }

    #[test]
    fn max_stacked_hours_is_the_tallest_day() {
        let records = vec![
            record("Study", (2024, 1, 1), (9, 0, 0), 1.0),
            record("Game", (2024, 1, 1), (11, 0, 0), 2.5),
            record("Study", (2024, 1, 2), (9, 0, 0), 3.0),
        ];

        let totals = summarize_by_day(&records);
        assert!((totals.max_stacked_hours() - 3.5).abs() < 1e-9);
    }
}
