mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{parse_envelope, td_cmd, TestHome};

fn add(home: &TestHome, owner: &str, args: &[&str]) {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    td_cmd(home, owner).args(&full).assert().success();
}

fn list_json(home: &TestHome, owner: &str, args: &[&str]) -> Value {
    let mut full = vec!["list", "--json"];
    full.extend_from_slice(args);
    let output = td_cmd(home, owner)
        .args(&full)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_envelope(&output)
}

/// One high-priority overdue incomplete, one medium future incomplete,
/// one low-priority completed.
fn seed_dashboard(home: &TestHome) {
    add(home, "alice", &["Ship release", "--deadline", "2020-01-01", "--priority", "high"]);
    add(home, "alice", &["Plan sprint", "--deadline", "2099-01-01", "--priority", "medium"]);
    add(home, "alice", &["Water plants", "--deadline", "2099-06-01", "--priority", "low"]);

    let done = list_json(home, "alice", &["--search", "Water plants"]);
    let id = done["data"]["tasks"][0]["id"].as_str().expect("id").to_string();
    td_cmd(home, "alice").args(["done", id.as_str()]).assert().success();
}

#[test]
fn list_returns_tasks_pagination_and_statistics() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    seed_dashboard(&home);

    let envelope = list_json(&home, "alice", &[]);
    assert_eq!(envelope["command"], "list");
    let data = &envelope["data"];

    assert_eq!(data["tasks"].as_array().expect("tasks").len(), 3);
    assert_eq!(data["pagination"]["total"], 3);
    assert_eq!(data["pagination"]["pages"], 1);
    assert_eq!(data["pagination"]["currentPage"], 1);
    assert_eq!(data["statistics"]["totalTasks"], 3);
    assert_eq!(data["statistics"]["completedTasks"], 1);
    assert_eq!(data["statistics"]["highPriority"], 1);
    assert_eq!(data["statistics"]["overdueTasks"], 1);
    Ok(())
}

#[test]
fn dashboard_scenario_priority_desc_page_of_two() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    seed_dashboard(&home);

    let envelope = list_json(&home, "alice", &["--sort", "priority:desc", "--limit", "2"]);
    let data = &envelope["data"];

    let tasks = data["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Ship release");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(data["pagination"]["pages"], 2);
    assert_eq!(data["statistics"]["overdueTasks"], 1);
    assert_eq!(data["statistics"]["totalTasks"], 3);
    assert_eq!(data["statistics"]["completedTasks"], 1);
    Ok(())
}

#[test]
fn search_is_case_insensitive_over_title_and_description()
-> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    add(&home, "alice", &["Report Q1", "--deadline", "2099-01-01"]);
    add(
        &home,
        "alice",
        &["Shopping list", "--deadline", "2099-01-01", "--description", "groceries for the week"],
    );

    let found = list_json(&home, "alice", &["--search", "REPORT q1"]);
    let tasks = found["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Report Q1");

    let by_description = list_json(&home, "alice", &["--search", "GROCERIES"]);
    let tasks = by_description["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Shopping list");
    Ok(())
}

#[test]
fn filters_combine_with_and_semantics() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    add(
        &home,
        "alice",
        &["Pay invoices", "--deadline", "2099-01-01", "--priority", "high", "--category", "work", "--tag", "finance"],
    );
    add(
        &home,
        "alice",
        &["Review budget", "--deadline", "2099-01-01", "--priority", "high", "--category", "work"],
    );
    add(
        &home,
        "alice",
        &["Buy groceries", "--deadline", "2099-01-01", "--priority", "low", "--category", "home", "--tag", "finance"],
    );

    let envelope = list_json(
        &home,
        "alice",
        &["--priority", "high", "--category", "work", "--tag", "finance"],
    );
    let tasks = envelope["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Pay invoices");
    Ok(())
}

#[test]
fn completed_filter_partitions_the_set() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    seed_dashboard(&home);

    let done = list_json(&home, "alice", &["--completed"]);
    let pending = list_json(&home, "alice", &["--pending"]);

    let done_total = done["data"]["pagination"]["total"].as_u64().expect("total");
    let pending_total = pending["data"]["pagination"]["total"].as_u64().expect("total");
    let all = done["data"]["statistics"]["totalTasks"].as_u64().expect("stats");
    assert_eq!(done_total + pending_total, all);

    td_cmd(&home, "alice")
        .args(["list", "--completed", "--pending"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn date_range_filters_deadline_inclusively() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    add(&home, "alice", &["January", "--deadline", "2099-01-15"]);
    add(&home, "alice", &["February", "--deadline", "2099-02-15"]);
    add(&home, "alice", &["March", "--deadline", "2099-03-15"]);

    let envelope = list_json(&home, "alice", &["--from", "2099-02-15", "--to", "2099-02-15"]);
    let tasks = envelope["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "February");

    td_cmd(&home, "alice")
        .args(["list", "--from", "2099-03-01", "--to", "2099-01-01"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid query"));
    Ok(())
}

#[test]
fn sort_orders_by_deadline_and_title() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    add(&home, "alice", &["Banana", "--deadline", "2099-03-01"]);
    add(&home, "alice", &["apple", "--deadline", "2099-01-01"]);
    add(&home, "alice", &["Cherry", "--deadline", "2099-02-01"]);

    let by_deadline = list_json(&home, "alice", &["--sort", "deadline"]);
    let titles: Vec<&str> = by_deadline["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["apple", "Cherry", "Banana"]);

    let by_title = list_json(&home, "alice", &["--sort", "title"]);
    let titles: Vec<&str> = by_title["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["apple", "Banana", "Cherry"]);
    Ok(())
}

#[test]
fn page_past_the_end_is_empty_with_correct_metadata()
-> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    seed_dashboard(&home);

    let envelope = list_json(&home, "alice", &["--limit", "2", "--page", "5"]);
    let data = &envelope["data"];
    assert!(data["tasks"].as_array().expect("tasks").is_empty());
    assert_eq!(data["pagination"]["total"], 3);
    assert_eq!(data["pagination"]["pages"], 2);
    assert_eq!(data["pagination"]["currentPage"], 5);
    Ok(())
}

#[test]
fn invalid_pagination_and_sort_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    seed_dashboard(&home);

    td_cmd(&home, "alice")
        .args(["list", "--page", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("page must be >= 1"));

    td_cmd(&home, "alice")
        .args(["list", "--limit", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("limit must be >= 1"));

    td_cmd(&home, "alice")
        .args(["list", "--sort", "severity"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("unknown sort field"));
    Ok(())
}

#[test]
fn list_only_sees_the_owners_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    add(&home, "alice", &["Alice task", "--deadline", "2099-01-01"]);
    add(&home, "bob", &["Bob task", "--deadline", "2099-01-01"]);

    let envelope = list_json(&home, "alice", &[]);
    let data = &envelope["data"];
    assert_eq!(data["pagination"]["total"], 1);
    assert_eq!(data["tasks"][0]["ownerId"], "alice");
    assert_eq!(data["statistics"]["totalTasks"], 1);
    Ok(())
}

#[test]
fn config_default_limit_applies() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::new();
    home.write_config("[query]\ndefault_limit = 2\n")?;
    seed_dashboard(&home);

    let envelope = list_json(&home, "alice", &[]);
    let data = &envelope["data"];
    assert_eq!(data["tasks"].as_array().expect("tasks").len(), 2);
    assert_eq!(data["pagination"]["limit"], 2);
    assert_eq!(data["pagination"]["pages"], 2);
    Ok(())
}
