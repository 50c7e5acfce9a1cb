mod common;

use common::{add_project, add_task, run_json, setup_workspace, sprint_command, titles};
use predicates::prelude::*;

#[test]
fn test_board_groups_tasks_by_status() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    add_task(temp_dir.path(), "Alpha", "Plan", "2025-03-10");
    let build = add_task(temp_dir.path(), "Alpha", "Build", "2025-03-11");
    let ship = add_task(temp_dir.path(), "Alpha", "Ship", "2025-03-12");
    run_json(temp_dir.path(), &["task", "drop", &build, "in_progress"]);
    run_json(temp_dir.path(), &["task", "drop", &ship, "done"]);

    let board = run_json(temp_dir.path(), &["view", "board", "-p", "Alpha"]);
    let columns = board.as_array().unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0]["status"], "todo");
    assert_eq!(titles(&columns[0]["tasks"]), vec!["Plan"]);
    assert_eq!(titles(&columns[1]["tasks"]), vec!["Build"]);
    assert_eq!(titles(&columns[2]["tasks"]), vec!["Ship"]);
}

#[test]
fn test_board_text_shows_empty_columns() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    add_task(temp_dir.path(), "Alpha", "Plan", "2025-03-10");

    sprint_command(temp_dir.path())
        .args(["view", "board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1)"))
        .stdout(predicate::str::contains("(0)"));
}

#[test]
fn test_calendar_caps_visible_tasks_per_day() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    for title in ["One", "Two", "Three", "Four", "Five"] {
        add_task(temp_dir.path(), "Alpha", title, "2025-03-10");
    }
    add_task(temp_dir.path(), "Alpha", "Earlier", "2025-03-03");

    let days = run_json(temp_dir.path(), &["view", "calendar", "-p", "Alpha"]);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-03-03");
    assert_eq!(days[1]["total"], 5);
    assert_eq!(days[1]["hidden"], 2);
    assert_eq!(titles(&days[1]["visible"]), vec!["One", "Two", "Three"]);

    sprint_command(temp_dir.path())
        .args(["view", "calendar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+2 more"));
}

#[test]
fn test_month_grid_starts_on_sunday() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    add_task(temp_dir.path(), "Alpha", "Due", "2025-03-15");

    let weeks = run_json(temp_dir.path(), &["view", "month", "2025-03"]);
    let weeks = weeks.as_array().unwrap();
    // March 2025 starts on a Saturday and ends on a Monday
    assert_eq!(weeks.len(), 6);
    assert_eq!(weeks[0]["days"][0]["date"], "2025-02-23");
    assert_eq!(weeks[0]["days"][0]["in_month"], false);

    let marked: Vec<_> = weeks
        .iter()
        .flat_map(|w| w["days"].as_array().unwrap().iter())
        .filter(|d| d["total"] == 1)
        .map(|d| d["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(marked, vec!["2025-03-15"]);
}

#[test]
fn test_month_rejects_bad_input() {
    let temp_dir = setup_workspace();

    sprint_command(temp_dir.path())
        .args(["view", "month", "March"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"));
}

#[test]
fn test_timeline_spans_start_and_due_dates() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    run_json(
        temp_dir.path(),
        &[
            "task", "add", "Research", "-p", "Alpha", "--start", "2025-03-01", "--due",
            "2025-03-05",
        ],
    );
    add_task(temp_dir.path(), "Alpha", "Write", "2025-03-10");

    let timeline = run_json(temp_dir.path(), &["view", "timeline", "-p", "Alpha"]);
    assert_eq!(timeline["start"], "2025-03-01");
    assert_eq!(timeline["end"], "2025-03-10");
    assert_eq!(timeline["total_days"], 10);

    let bars = timeline["bars"].as_array().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0]["offset_days"], 0);
    assert_eq!(bars[0]["duration_days"], 4);
    assert_eq!(bars[1]["duration_days"], 1);
}

#[test]
fn test_timeline_without_tasks() {
    let temp_dir = setup_workspace();

    sprint_command(temp_dir.path())
        .args(["view", "timeline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks to display"));

    let timeline = run_json(temp_dir.path(), &["view", "timeline"]);
    assert!(timeline.is_null());
}
