//! td task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::owner;
use crate::query::{QueryEngine, QueryRequest, QueryResult, SortSpec, TaskStatistics};
use crate::storage::Storage;
use crate::store::{FileStore, TaskStore};
use crate::task::{Priority, Task, TaskDraft, TaskPatch};

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub deadline: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub search: Option<String>,
    pub priority: Option<String>,
    pub completed: bool,
    pub pending: bool,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub page: u64,
    pub limit: Option<u64>,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompleteOptions {
    pub id: String,
    pub completed: bool,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: String,
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatsOptions {
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

struct TaskContext {
    store: FileStore,
    config: Config,
    owner: String,
}

fn load_context(data_dir: Option<PathBuf>, cli_owner: Option<String>) -> Result<TaskContext> {
    let storage = Storage::resolve(data_dir)?;
    let config = Config::load(&storage.config_file())?;
    let owner = owner::resolve_owner(&storage, &config, cli_owner.as_deref())?;
    storage.init()?;
    Ok(TaskContext {
        store: FileStore::new(storage),
        config,
        owner,
    })
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;

    let draft = TaskDraft {
        title: options.title,
        description: options.description,
        priority: Some(options.priority.parse::<Priority>()?),
        deadline: parse_point("deadline", &options.deadline, false)?,
        categories: options.categories,
        tags: options.tags,
    };
    let task = ctx.store.insert(Task::new(ctx.owner.clone(), draft)?)?;

    let mut human = HumanOutput::new(format!("Task {} created", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Deadline", task.deadline.to_rfc3339());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &task,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;

    let completed = match (options.completed, options.pending) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;
    let sort_by = match options.sort.as_deref() {
        Some(spec) => Some(SortSpec::parse(spec)?),
        None => Some(default_sort(&ctx.config)?),
    };

    let request = QueryRequest {
        search: options.search,
        priority,
        completed,
        category: options.category,
        tag: options.tag,
        start_date: options
            .from
            .as_deref()
            .map(|raw| parse_point("from", raw, false))
            .transpose()?,
        end_date: options
            .to
            .as_deref()
            .map(|raw| parse_point("to", raw, true))
            .transpose()?,
        sort_by,
        page: options.page,
        limit: options.limit.unwrap_or(ctx.config.query.default_limit),
    };

    let engine = QueryEngine::new(&ctx.store);
    let result = engine.query(&ctx.owner, &request)?;

    let human = format_list(&result);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &result,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;
    let id = ctx.store.resolve_id(&ctx.owner, &options.id)?;
    let task = ctx.store.get(&ctx.owner, &id)?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Title", task.title.clone());
    if let Some(description) = task.description.as_deref() {
        human.push_summary("Description", description.to_string());
    }
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Deadline", task.deadline.to_rfc3339());
    human.push_summary("Completed", if task.completed { "yes" } else { "no" }.to_string());
    if !task.categories.is_empty() {
        human.push_summary("Categories", join_set(&task.categories));
    }
    if !task.tags.is_empty() {
        human.push_summary("Tags", join_set(&task.tags));
    }
    human.push_summary("Created", task.created_at.to_rfc3339());
    human.push_summary("Updated", task.updated_at.to_rfc3339());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &task,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;
    let id = ctx.store.resolve_id(&ctx.owner, &options.id)?;

    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        deadline: options
            .deadline
            .as_deref()
            .map(|raw| parse_point("deadline", raw, false))
            .transpose()?,
        categories: options.categories,
        tags: options.tags,
        completed: None,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit; pass at least one field".to_string(),
        ));
    }

    let task = ctx.store.update(&ctx.owner, &id, patch)?;

    let mut human = HumanOutput::new(format!("Task {} updated", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Updated", task.updated_at.to_rfc3339());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &task,
        Some(&human),
    )
}

pub fn run_set_completed(options: CompleteOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;
    let id = ctx.store.resolve_id(&ctx.owner, &options.id)?;

    let task = ctx.store.update(
        &ctx.owner,
        &id,
        TaskPatch {
            completed: Some(options.completed),
            ..TaskPatch::default()
        },
    )?;

    let verb = if options.completed { "completed" } else { "reopened" };
    let command = if options.completed { "done" } else { "reopen" };
    let mut human = HumanOutput::new(format!("Task {} {verb}", task.id));
    human.push_summary("Title", task.title.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &task,
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct RmOutput {
    id: String,
    deleted: bool,
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;
    let id = ctx.store.resolve_id(&ctx.owner, &options.id)?;
    ctx.store.delete(&ctx.owner, &id)?;

    let output = RmOutput {
        id: id.clone(),
        deleted: true,
    };
    let human = HumanOutput::new(format!("Task {id} deleted"));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "rm",
        &output,
        Some(&human),
    )
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir, options.owner)?;
    let engine = QueryEngine::new(&ctx.store);
    let stats = engine.statistics(&ctx.owner)?;

    let human = format_stats(&stats);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &stats,
        Some(&human),
    )
}

fn default_sort(config: &Config) -> Result<SortSpec> {
    SortSpec::parse(&config.query.default_sort).map_err(|err| {
        Error::InvalidConfig(format!(
            "query.default_sort '{}': {err}",
            config.query.default_sort
        ))
    })
}

/// Parse an RFC 3339 timestamp or a bare date. Bare dates snap to the
/// start of the day, or its end when used as an inclusive upper bound.
fn parse_point(label: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid {label} '{trimmed}' (expected RFC 3339 or YYYY-MM-DD)"
        ))
    })?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidArgument(format!("invalid {label} '{trimmed}'")))
}

fn format_list(result: &QueryResult) -> HumanOutput {
    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Matching", result.pagination.total.to_string());
    human.push_summary(
        "Page",
        format!("{}/{}", result.pagination.current_page, result.pagination.pages),
    );
    human.push_summary("All tasks", result.statistics.total_tasks.to_string());
    human.push_summary("Completed", result.statistics.completed_tasks.to_string());
    if result.statistics.overdue_tasks > 0 {
        human.push_warning(format!("{} task(s) overdue", result.statistics.overdue_tasks));
    }
    for task in &result.tasks {
        human.push_detail(format_task_line(task));
    }
    human
}

fn format_stats(stats: &TaskStatistics) -> HumanOutput {
    let mut human = HumanOutput::new("Task statistics");
    human.push_summary("Total", stats.total_tasks.to_string());
    human.push_summary("Completed", stats.completed_tasks.to_string());
    human.push_summary("High priority", stats.high_priority.to_string());
    human.push_summary("Medium priority", stats.medium_priority.to_string());
    human.push_summary("Low priority", stats.low_priority.to_string());
    human.push_summary("Overdue", stats.overdue_tasks.to_string());
    human
}

fn format_task_line(task: &Task) -> String {
    let state = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{state}][{}] {} {} (due {})",
        task.priority,
        task.id,
        task.title,
        task.deadline.format("%Y-%m-%d")
    );
    if !task.tags.is_empty() {
        line.push_str(&format!(" #{}", join_set(&task.tags)));
    }
    line
}

fn join_set(values: &std::collections::BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_rfc3339() {
        let parsed = parse_point("from", "2026-03-01T12:30:00Z", false).expect("parse");
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T12:30:00+00:00");
    }

    #[test]
    fn bare_date_snaps_to_day_bounds() {
        let start = parse_point("from", "2026-03-01", false).expect("parse");
        let end = parse_point("to", "2026-03-01", true).expect("parse");
        assert_eq!(start.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-01T23:59:59+00:00");
    }

    #[test]
    fn garbage_date_is_rejected_with_label() {
        let err = parse_point("deadline", "next tuesday", false).expect_err("garbage");
        assert!(err.to_string().contains("deadline"));
    }
}
