mod common;

use common::{add_project, add_task, run_json, setup_workspace, sprint_command, titles};
use predicates::prelude::*;

#[test]
fn test_category_lifecycle_detaches_tasks() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    let category = run_json(
        temp_dir.path(),
        &["category", "add", "Reading", "--color", "green"],
    );
    assert_eq!(category["color"], "#22c55e");

    let task = run_json(
        temp_dir.path(),
        &["task", "add", "Book", "-p", "Alpha", "--due", "2025-03-10", "-c", "reading"],
    );
    assert_eq!(task["category_id"], category["id"]);
    let task_id = task["id"].as_str().unwrap().to_string();

    sprint_command(temp_dir.path())
        .args(["category", "delete", "Reading"])
        .assert()
        .success();

    let task = run_json(temp_dir.path(), &["task", "get", &task_id]);
    assert!(task["category_id"].is_null());
}

#[test]
fn test_category_rejects_bad_color() {
    let temp_dir = setup_workspace();

    sprint_command(temp_dir.path())
        .args(["category", "add", "Ops", "--color", "#12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"));
}

#[test]
fn test_skill_digest_groups_finished_tasks() {
    let temp_dir = setup_workspace();
    add_project(temp_dir.path(), "Alpha");
    let tagged = add_task(temp_dir.path(), "Alpha", "Borrow checker deep dive", "2025-03-10");
    let untagged = add_task(temp_dir.path(), "Alpha", "Inbox zero", "2025-03-10");
    add_task(temp_dir.path(), "Alpha", "Still open", "2025-03-10");

    run_json(temp_dir.path(), &["skill", "add", "Rust"]);
    run_json(temp_dir.path(), &["skill", "attach", &tagged, "rust"]);
    run_json(temp_dir.path(), &["task", "drop", &tagged, "done"]);
    run_json(temp_dir.path(), &["task", "drop", &untagged, "done"]);

    let digest = run_json(temp_dir.path(), &["skill", "digest", "--days", "7"]);
    let groups = digest.as_array().unwrap();
    assert_eq!(groups.len(), 2);

    let rust = groups.iter().find(|g| g["skills"] == "Rust").unwrap();
    assert_eq!(titles(&rust["tasks"]), vec!["Borrow checker deep dive"]);
    let none = groups.iter().find(|g| g["skills"] == "No skills").unwrap();
    assert_eq!(titles(&none["tasks"]), vec!["Inbox zero"]);
}

#[test]
fn test_duplicate_skill_rejected() {
    let temp_dir = setup_workspace();
    run_json(temp_dir.path(), &["skill", "add", "Writing"]);

    sprint_command(temp_dir.path())
        .args(["skill", "add", "Writing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"));
}

#[test]
fn test_goals_listed_by_target_date() {
    let temp_dir = setup_workspace();
    run_json(
        temp_dir.path(),
        &["goal", "add", "Staff engineer", "--target", "2026-12-31"],
    );
    run_json(
        temp_dir.path(),
        &["goal", "add", "Give a talk", "--target", "2026-06-01"],
    );

    let goals = run_json(temp_dir.path(), &["goal", "list"]);
    assert_eq!(titles(&goals), vec!["Give a talk", "Staff engineer"]);
}

#[test]
fn test_review_cadence_and_sessions() {
    let temp_dir = setup_workspace();

    let cadence = run_json(temp_dir.path(), &["review", "cadence"]);
    assert!(cadence.is_null());

    let cadence = run_json(
        temp_dir.path(),
        &["review", "cadence", "--one-on-one", "weekly"],
    );
    assert_eq!(cadence["one_on_one"], "weekly");
    assert_eq!(cadence["performance"], "quarterly");

    run_json(temp_dir.path(), &["review", "add", "performance", "2026-03-01"]);
    run_json(
        temp_dir.path(),
        &["review", "add", "one_on_one", "2026-01-15", "-n", "career chat"],
    );

    let sessions = run_json(temp_dir.path(), &["review", "list"]);
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["kind"], "one_on_one");
    assert_eq!(sessions[0]["notes"], "career chat");

    let performance = run_json(
        temp_dir.path(),
        &["review", "list", "--kind", "performance"],
    );
    assert_eq!(performance.as_array().unwrap().len(), 1);
}
