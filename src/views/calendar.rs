use crate::db::models::Task;
use crate::time_utils::{end_of_month, end_of_week, start_of_month, start_of_week};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tasks shown per day before the cell collapses into "+N more"
pub const MAX_VISIBLE_PER_DAY: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days of a month grid
    pub in_month: bool,
    pub visible: Vec<Task>,
    pub total: usize,
    pub hidden: usize,
}

impl DayCell {
    fn new(date: NaiveDate, in_month: bool, tasks: Vec<&Task>) -> Self {
        let total = tasks.len();
        Self {
            date,
            in_month,
            visible: tasks
                .into_iter()
                .take(MAX_VISIBLE_PER_DAY)
                .cloned()
                .collect(),
            total,
            hidden: total.saturating_sub(MAX_VISIBLE_PER_DAY),
        }
    }

    /// e.g. "+2 more"; `None` when nothing is hidden
    pub fn more_label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+{} more", self.hidden))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarWeek {
    pub days: Vec<DayCell>,
}

fn group_by_due(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        days.entry(task.due_date).or_default().push(task);
    }
    days
}

/// Days that have at least one task due, ascending.
///
/// `tasks` is an already projected sequence; order within a day follows it.
pub fn project_calendar(tasks: &[Task]) -> Vec<DayCell> {
    group_by_due(tasks)
        .into_iter()
        .map(|(date, due)| DayCell::new(date, true, due))
        .collect()
}

/// Sunday-start weeks covering the month containing `month`
pub fn project_month(tasks: &[Task], month: NaiveDate) -> Vec<CalendarWeek> {
    let first = start_of_month(month);
    let grid_start = start_of_week(first);
    let grid_end = end_of_week(end_of_month(month));

    let mut by_day = group_by_due(tasks);
    let mut weeks = Vec::new();
    let mut week = Vec::with_capacity(7);

    for date in grid_start.iter_days().take_while(|d| *d <= grid_end) {
        let due = by_day.remove(&date).unwrap_or_default();
        let in_month = date.month() == first.month() && date.year() == first.year();
        week.push(DayCell::new(date, in_month, due));

        if week.len() == 7 {
            weeks.push(CalendarWeek {
                days: std::mem::take(&mut week),
            });
        }
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::{ids, task};
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_five_tasks_one_day_shows_three_plus_more() {
        let tasks: Vec<Task> = (0..5).map(|i| task(&format!("t{}", i), i)).collect();

        let days = project_calendar(&tasks);
        assert_eq!(days.len(), 1);
        let cell = &days[0];
        assert_eq!(cell.total, 5);
        assert_eq!(cell.hidden, 2);
        assert_eq!(ids(&cell.visible), vec!["t0", "t1", "t2"]);
        assert_eq!(cell.more_label().as_deref(), Some("+2 more"));
    }

    #[test]
    fn test_days_ascending() {
        let mut a = task("a", 0);
        a.due_date = d(2025, 1, 20);
        let mut b = task("b", 1);
        b.due_date = d(2025, 1, 5);

        let days = project_calendar(&[a, b]);
        let dates: Vec<_> = days.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(2025, 1, 5), d(2025, 1, 20)]);
        assert!(days[0].more_label().is_none());
    }

    #[test]
    fn test_month_grid_starts_on_sunday() {
        // February 2025 starts on a Saturday and ends on a Friday
        let mut a = task("a", 0);
        a.due_date = d(2025, 2, 14);

        let weeks = project_month(&[a], d(2025, 2, 10));
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.days.len() == 7));

        let first = &weeks[0].days[0];
        assert_eq!(first.date, d(2025, 1, 26));
        assert_eq!(first.date.weekday(), Weekday::Sun);
        assert!(!first.in_month);

        let last = &weeks[4].days[6];
        assert_eq!(last.date, d(2025, 3, 1));
        assert!(!last.in_month);

        let valentine = weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .find(|c| c.date == d(2025, 2, 14))
            .unwrap();
        assert!(valentine.in_month);
        assert_eq!(valentine.total, 1);
    }
}
