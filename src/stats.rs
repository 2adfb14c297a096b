// src/stats.rs
use crate::dates::{date_key, days_in_month, last_n_days_from};
use crate::model::{Exercise, WorkoutLog};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Number of days covered by the weekly chart.
pub const WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    /// Short "M/D" label for chart axes.
    pub label: String,
    pub total_sets: usize,
    pub total_volume: f64,
}

/// True if the date has at least one exercise logged.
pub fn has_workout(log: &WorkoutLog, date: NaiveDate) -> bool {
    log.get(&date_key(date)).is_some_and(|exs| !exs.is_empty())
}

/// Number of dates with at least one exercise. Dates whose list was
/// emptied in the editor do not count.
pub fn total_workout_days(log: &WorkoutLog) -> usize {
    log.values().filter(|exs| !exs.is_empty()).count()
}

fn day_stats(log: &WorkoutLog, date: NaiveDate) -> DayStats {
    let exercises = log.get(&date_key(date)).map_or(&[][..], Vec::as_slice);
    DayStats {
        date,
        label: format!("{}/{}", date.month(), date.day()),
        total_sets: exercises.iter().map(|e| e.sets.len()).sum(),
        total_volume: exercises.iter().map(Exercise::volume).sum(),
    }
}

/// Sets and volume for each of the seven days ending at `today`, oldest first.
pub fn weekly_stats_from(log: &WorkoutLog, today: NaiveDate) -> Vec<DayStats> {
    last_n_days_from(today, WEEK_DAYS)
        .into_iter()
        .map(|d| day_stats(log, d))
        .collect()
}

/// `weekly_stats_from` anchored at the local current date.
pub fn weekly_stats(log: &WorkoutLog) -> Vec<DayStats> {
    weekly_stats_from(log, crate::dates::today())
}

/// Sets logged across a run of days, e.g. the weekly chart.
pub fn weekly_total_sets(week: &[DayStats]) -> usize {
    week.iter().map(|d| d.total_sets).sum()
}

/// Each day of the month paired with its "has workout" flag.
pub fn month_overview(log: &WorkoutLog, year: i32, month: u32) -> Vec<(NaiveDate, bool)> {
    days_in_month(year, month)
        .into_iter()
        .map(|d| (d, has_workout(log, d)))
        .collect()
}

/// One line per recent logged date, newest first:
/// `Date: 2024-05-01 | Activities: Squat: 2 sets (Best: 65kg), ...`
///
/// Takes the `max_days` greatest keys that have at least one exercise.
pub fn recent_summary_text(log: &WorkoutLog, max_days: usize) -> String {
    log.iter()
        .rev()
        .filter(|(_, exs)| !exs.is_empty())
        .take(max_days)
        .map(|(date, exs)| {
            let details = exs
                .iter()
                .map(|e| format!("{}: {} sets (Best: {}kg)", e.name, e.sets.len(), e.best_weight()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Date: {date} | Activities: {details}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
