use crate::db::models::Task;
use crate::time_utils::days_between;
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Number of tick marks the axis aims for
const TARGET_TICKS: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineBar {
    pub task: Task,
    /// Days from the axis start to the bar start
    pub offset_days: i64,
    /// Bar length in days, never less than one
    pub duration_days: i64,
    pub offset_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineTick {
    pub date: NaiveDate,
    pub offset_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
    pub ticks: Vec<TimelineTick>,
    pub bars: Vec<TimelineBar>,
}

fn bar_start(task: &Task) -> NaiveDate {
    task.start_date.unwrap_or(task.due_date)
}

/// Lay tasks out on a shared date axis.
///
/// A task without a start date is a one-day bar on its due date. Returns
/// `None` for an empty task set.
pub fn project_timeline(tasks: &[Task]) -> Option<Timeline> {
    let start = tasks.iter().map(|t| bar_start(t).min(t.due_date)).min()?;
    let end = tasks.iter().map(|t| bar_start(t).max(t.due_date)).max()?;
    let total_days = days_between(start, end) + 1;
    let scale = total_days as f64;

    let bars = tasks
        .iter()
        .map(|task| {
            let offset_days = days_between(start, bar_start(task));
            let duration_days = days_between(bar_start(task), task.due_date).max(1);
            TimelineBar {
                task: task.clone(),
                offset_days,
                duration_days,
                offset_percent: offset_days as f64 / scale * 100.0,
                width_percent: duration_days as f64 / scale * 100.0,
            }
        })
        .collect();

    let step = ((total_days + TARGET_TICKS - 1) / TARGET_TICKS).max(1);
    let ticks = (0..=total_days)
        .step_by(step as usize)
        .filter_map(|offset| {
            start
                .checked_add_days(Days::new(offset as u64))
                .map(|date| TimelineTick {
                    date,
                    offset_days: offset,
                })
        })
        .collect();

    Some(Timeline {
        start,
        end,
        total_days,
        ticks,
        bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::task;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_empty_set_has_no_timeline() {
        assert!(project_timeline(&[]).is_none());
    }

    #[test]
    fn test_axis_spans_starts_and_dues() {
        let mut a = task("a", 0);
        a.start_date = Some(d(2025, 1, 1));
        a.due_date = d(2025, 1, 5);
        let mut b = task("b", 1);
        b.due_date = d(2025, 1, 20);

        let timeline = project_timeline(&[a, b]).unwrap();
        assert_eq!(timeline.start, d(2025, 1, 1));
        assert_eq!(timeline.end, d(2025, 1, 20));
        assert_eq!(timeline.total_days, 20);

        let first = &timeline.bars[0];
        assert_eq!(first.offset_days, 0);
        assert_eq!(first.duration_days, 4);
        assert!((first.width_percent - 20.0).abs() < 1e-9);

        // No start date: one day ending on the due date
        let second = &timeline.bars[1];
        assert_eq!(second.offset_days, 19);
        assert_eq!(second.duration_days, 1);
        assert!((second.offset_percent - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_ticks_every_tenth_of_axis() {
        let mut a = task("a", 0);
        a.start_date = Some(d(2025, 1, 1));
        a.due_date = d(2025, 1, 20);

        let timeline = project_timeline(&[a]).unwrap();
        let offsets: Vec<_> = timeline.ticks.iter().map(|t| t.offset_days).collect();
        assert_eq!(offsets, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
        assert_eq!(timeline.ticks[1].date, d(2025, 1, 3));
    }

    #[test]
    fn test_single_day_axis() {
        let timeline = project_timeline(&[task("a", 0)]).unwrap();
        assert_eq!(timeline.total_days, 1);
        assert_eq!(timeline.ticks.len(), 2);
        assert!((timeline.bars[0].width_percent - 100.0).abs() < f64::EPSILON);
    }
}
