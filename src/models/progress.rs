use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::Routine;

/// Number of days covered by `completion_rate_30d`.
pub const COMPLETION_WINDOW_DAYS: i64 = 30;

/// Derived progress for one routine.
///
/// Streaks count consecutive *due* days (per the routine's schedule) with an
/// execution. Today only counts once it has been executed; an unexecuted
/// today does not break a streak.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RoutineProgress {
    pub routine_id: Uuid,
    pub name: String,
    pub total_executions: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_executed_on: Option<NaiveDate>,
    /// Share of due days in the last 30 days that were executed (0.0 - 1.0)
    pub completion_rate_30d: f64,
}

impl RoutineProgress {
    pub fn compute(routine: &Routine, executions: &[NaiveDate], today: NaiveDate) -> Self {
        let dates: BTreeSet<NaiveDate> = executions.iter().copied().filter(|d| *d <= today).collect();

        let created_on = routine.created_at.date_naive();
        let start = dates
            .first()
            .map_or(created_on, |first| (*first).min(created_on))
            .min(today);

        let window_start = today - Duration::days(COMPLETION_WINDOW_DAYS - 1);

        let mut run: u32 = 0;
        let mut longest: u32 = 0;
        let mut due_in_window: u32 = 0;
        let mut done_in_window: u32 = 0;

        let mut day = start;
        while day <= today {
            if routine.schedule.is_due(day) {
                let executed = dates.contains(&day);
                let in_window = day >= window_start;

                if executed {
                    run += 1;
                    longest = longest.max(run);
                    if in_window {
                        due_in_window += 1;
                        done_in_window += 1;
                    }
                } else if day < today {
                    run = 0;
                    if in_window {
                        due_in_window += 1;
                    }
                }
            }
            day += Duration::days(1);
        }

        let completion_rate_30d = if due_in_window == 0 {
            0.0
        } else {
            f64::from(done_in_window) / f64::from(due_in_window)
        };

        Self {
            routine_id: routine.id,
            name: routine.name.clone(),
            total_executions: dates.len() as u32,
            current_streak: run,
            longest_streak: longest,
            last_executed_on: dates.last().copied(),
            completion_rate_30d,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::models::{Schedule, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn routine_created(on: NaiveDate, schedule: Schedule) -> Routine {
        let created_at = Utc.from_utc_datetime(&on.and_hms_opt(8, 0, 0).unwrap());
        Routine {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            name: "Meditate".to_string(),
            description: None,
            schedule,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        }
    }

    fn days_back(today: NaiveDate, offsets: &[i64]) -> Vec<NaiveDate> {
        offsets.iter().map(|o| today - Duration::days(*o)).collect()
    }

    #[test]
    fn test_no_executions() {
        let today = date(2025, 6, 10);
        let routine = routine_created(today - Duration::days(3), Schedule::every_day());

        let progress = RoutineProgress::compute(&routine, &[], today);

        assert_eq!(progress.total_executions, 0);
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.longest_streak, 0);
        assert!(progress.last_executed_on.is_none());
        assert_eq!(progress.completion_rate_30d, 0.0);
    }

    #[rstest]
    #[case::through_today(vec![0, 1, 2], 3)]
    #[case::today_pending(vec![1, 2, 3], 3)]
    #[case::broken_yesterday(vec![0, 2, 3], 1)]
    #[case::broken_long_ago(vec![5, 6], 0)]
    fn test_current_streak_daily(#[case] offsets: Vec<i64>, #[case] expected: u32) {
        let today = date(2025, 6, 10);
        let routine = routine_created(today - Duration::days(10), Schedule::every_day());

        let progress = RoutineProgress::compute(&routine, &days_back(today, &offsets), today);

        assert_eq!(progress.current_streak, expected);
    }

    #[test]
    fn test_longest_streak_survives_break() {
        let today = date(2025, 6, 10);
        let routine = routine_created(today - Duration::days(10), Schedule::every_day());
        let executions = days_back(today, &[0, 5, 6, 7, 8]);

        let progress = RoutineProgress::compute(&routine, &executions, today);

        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.longest_streak, 4);
        assert_eq!(progress.total_executions, 5);
        assert_eq!(progress.last_executed_on, Some(today));
    }

    #[test]
    fn test_streak_skips_days_not_due() {
        // Tuesday 2025-06-10; schedule Mon/Wed/Fri
        let today = date(2025, 6, 10);
        let schedule = Schedule::new(vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
        let routine = routine_created(date(2025, 6, 1), schedule);
        // Mon 9th, Fri 6th, Wed 4th
        let executions = vec![date(2025, 6, 9), date(2025, 6, 6), date(2025, 6, 4)];

        let progress = RoutineProgress::compute(&routine, &executions, today);

        assert_eq!(progress.current_streak, 3);
        assert_eq!(progress.longest_streak, 3);
        // Due days since creation: Mon 2, Wed 4, Fri 6, Mon 9 -> 3 of 4 done
        assert!((progress.completion_rate_30d - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_and_future_dates_ignored() {
        let today = date(2025, 6, 10);
        let routine = routine_created(today - Duration::days(1), Schedule::every_day());
        let executions = vec![today, today, today + Duration::days(1)];

        let progress = RoutineProgress::compute(&routine, &executions, today);

        assert_eq!(progress.total_executions, 1);
        assert_eq!(progress.last_executed_on, Some(today));
    }

    #[test]
    fn test_completion_rate_uses_thirty_day_window() {
        let today = date(2025, 6, 30);
        let routine = routine_created(today - Duration::days(100), Schedule::every_day());
        // every day of the window except the last 15 (today counted as executed)
        let offsets: Vec<i64> = (15..COMPLETION_WINDOW_DAYS).chain(std::iter::once(0)).collect();
        let executions = days_back(today, &offsets);

        let progress = RoutineProgress::compute(&routine, &executions, today);

        // 16 executed out of 30 due days
        assert!((progress.completion_rate_30d - 16.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_backdated_execution_before_creation_counts() {
        let today = date(2025, 6, 10);
        let routine = routine_created(today, Schedule::every_day());
        let executions = days_back(today, &[1, 2]);

        let progress = RoutineProgress::compute(&routine, &executions, today);

        assert_eq!(progress.current_streak, 2);
        assert_eq!(progress.total_executions, 2);
    }
}
