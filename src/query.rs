//! Task query engine: predicate construction, sorting, pagination, and
//! dashboard statistics.
//!
//! A query is a pure read over the store: it filters the owner's tasks,
//! sorts them with a stable order, slices one page, and independently
//! computes statistics over the owner's *entire* task set. Statistics
//! deliberately ignore the active filters so the dashboard shows global
//! counts next to a filtered list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{Priority, Task};

/// Default page size when a request does not specify one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Fields a query may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Deadline,
    Priority,
    CreatedAt,
    Title,
}

impl SortField {
    fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "deadline" => Ok(SortField::Deadline),
            "priority" => Ok(SortField::Priority),
            "createdAt" | "created_at" | "created" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            other => Err(Error::InvalidQuery(format!(
                "unknown sort field '{other}' (expected deadline, priority, createdAt, or title)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort specification, encoded on the wire as `field` or
/// `field:direction`. Direction defaults to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `"deadline"`, `"priority:desc"`, and the like.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (field, direction) = match trimmed.split_once(':') {
            Some((field, direction)) => {
                let direction = match direction.trim() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    other => {
                        return Err(Error::InvalidQuery(format!(
                            "unknown sort direction '{other}' (expected asc or desc)"
                        )))
                    }
                };
                (field, direction)
            }
            None => (trimmed, SortDirection::Asc),
        };
        Ok(Self {
            field: SortField::parse(field)?,
            direction,
        })
    }
}

impl Default for SortSpec {
    /// Most recently created first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// One named filter condition over task fields.
///
/// Conditions are storage-neutral: the in-memory evaluation below is
/// what the file store uses, but a relational or document backend could
/// translate each variant into its native query form instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Case-insensitive substring match against title OR description.
    Search(String),
    Priority(Priority),
    Completed(bool),
    /// Task's categories set contains the value.
    Category(String),
    /// Task's tags set contains the value.
    Tag(String),
    /// `deadline >= bound`, inclusive.
    DeadlineFrom(DateTime<Utc>),
    /// `deadline <= bound`, inclusive.
    DeadlineUntil(DateTime<Utc>),
}

impl Condition {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Condition::Search(needle) => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
            }
            Condition::Priority(priority) => task.priority == *priority,
            Condition::Completed(completed) => task.completed == *completed,
            Condition::Category(category) => task.categories.contains(category),
            Condition::Tag(tag) => task.tags.contains(tag),
            Condition::DeadlineFrom(bound) => task.deadline >= *bound,
            Condition::DeadlineUntil(bound) => task.deadline <= *bound,
        }
    }
}

/// An owner-scoped predicate: the owner restriction is mandatory and
/// every condition is AND-combined on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    owner_id: String,
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new(owner_id: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            owner_id: owner_id.into(),
            conditions,
        }
    }

    /// Owner restriction only, no further conditions. This is what the
    /// statistics pass uses.
    pub fn owner_only(owner_id: impl Into<String>) -> Self {
        Self::new(owner_id, Vec::new())
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.owner_id == self.owner_id
            && self.conditions.iter().all(|condition| condition.matches(task))
    }
}

/// Input to the query engine. All filter fields are optional;
/// pagination defaults to page 1 with [`DEFAULT_LIMIT`] tasks.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: Option<SortSpec>,
    /// 1-based page number.
    pub page: u64,
    /// Page size, must be >= 1.
    pub limit: u64,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            search: None,
            priority: None,
            completed: None,
            category: None,
            tag: None,
            start_date: None,
            end_date: None,
            sort_by: None,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryRequest {
    /// Reject malformed pagination and inverted date ranges. Invalid
    /// values are never clamped to a default.
    fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::InvalidQuery("page must be >= 1".to_string()));
        }
        if self.limit < 1 {
            return Err(Error::InvalidQuery("limit must be >= 1".to_string()));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(Error::InvalidQuery(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Build the owner-scoped predicate for this request.
    ///
    /// Whitespace-only search is treated as absent, matching what the
    /// dashboard sends when its search box is cleared.
    pub fn predicate(&self, owner_id: &str) -> Predicate {
        let mut conditions = Vec::new();
        if let Some(search) = self.search.as_deref() {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                conditions.push(Condition::Search(trimmed.to_string()));
            }
        }
        if let Some(priority) = self.priority {
            conditions.push(Condition::Priority(priority));
        }
        if let Some(completed) = self.completed {
            conditions.push(Condition::Completed(completed));
        }
        if let Some(category) = self.category.as_deref() {
            let trimmed = category.trim();
            if !trimmed.is_empty() {
                conditions.push(Condition::Category(trimmed.to_string()));
            }
        }
        if let Some(tag) = self.tag.as_deref() {
            let trimmed = tag.trim();
            if !trimmed.is_empty() {
                conditions.push(Condition::Tag(trimmed.to_string()));
            }
        }
        if let Some(start) = self.start_date {
            conditions.push(Condition::DeadlineFrom(start));
        }
        if let Some(end) = self.end_date {
            conditions.push(Condition::DeadlineUntil(end));
        }
        Predicate::new(owner_id, conditions)
    }
}

/// Pagination metadata for a query result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Count of tasks matching the predicate, across all pages.
    pub total: u64,
    /// Total pages, at least 1 even for an empty result.
    pub pages: u64,
    pub current_page: u64,
    pub limit: u64,
}

impl Pagination {
    fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            pages: total.div_ceil(limit).max(1),
            current_page: page,
            limit,
        }
    }
}

/// Dashboard statistics over the owner's full task set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    /// Deadline strictly before `now` and not completed.
    pub overdue_tasks: u64,
}

impl TaskStatistics {
    /// Compute statistics in one pass. `now` is sampled once by the
    /// caller so every task sees the same overdue boundary.
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total_tasks: tasks.len() as u64,
            completed_tasks: 0,
            high_priority: 0,
            medium_priority: 0,
            low_priority: 0,
            overdue_tasks: 0,
        };
        for task in tasks {
            if task.completed {
                stats.completed_tasks += 1;
            }
            match task.priority {
                Priority::High => stats.high_priority += 1,
                Priority::Medium => stats.medium_priority += 1,
                Priority::Low => stats.low_priority += 1,
            }
            if !task.completed && task.deadline < now {
                stats.overdue_tasks += 1;
            }
        }
        stats
    }
}

/// A full query result: one page of tasks plus pagination metadata and
/// owner-wide statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
    pub statistics: TaskStatistics,
}

/// Sort tasks in place. `std` sorts are stable, so equal keys keep the
/// store's original relative order and pagination stays deterministic
/// across identical requests.
pub fn sort_tasks(tasks: &mut [Task], spec: SortSpec) {
    tasks.sort_by(|left, right| {
        let ordering = match spec.field {
            SortField::Deadline => left.deadline.cmp(&right.deadline),
            SortField::Priority => left.priority.cmp(&right.priority),
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
            SortField::Title => left
                .title
                .to_lowercase()
                .cmp(&right.title.to_lowercase()),
        };
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// The query engine. Stateless beyond its store handle; every call is
/// an independent, idempotent read.
pub struct QueryEngine<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a dyn TaskStore) -> Self {
        Self { store }
    }

    /// Run one query: validate, filter, sort, paginate, and aggregate.
    ///
    /// Returns either a complete [`QueryResult`] or an error, never a
    /// partial result.
    pub fn query(&self, owner_id: &str, request: &QueryRequest) -> Result<QueryResult> {
        request.validate()?;

        let predicate = request.predicate(owner_id);
        let mut matched = self.store.find_by_owner(owner_id, &predicate)?;
        let total = matched.len() as u64;

        sort_tasks(&mut matched, request.sort_by.unwrap_or_default());

        let pagination = Pagination::new(total, request.page, request.limit);
        let offset = (request.page - 1).saturating_mul(request.limit);
        let tasks: Vec<Task> = matched
            .into_iter()
            .skip(offset as usize)
            .take(request.limit as usize)
            .collect();

        // Statistics cover the whole owner set, ignoring the filters
        // above, with a single `now` for the overdue boundary.
        let everything = self
            .store
            .find_by_owner(owner_id, &Predicate::owner_only(owner_id))?;
        let statistics = TaskStatistics::compute(&everything, Utc::now());

        Ok(QueryResult {
            tasks,
            pagination,
            statistics,
        })
    }

    /// Count tasks matching the request's filters, without paging.
    pub fn count(&self, owner_id: &str, request: &QueryRequest) -> Result<u64> {
        let predicate = request.predicate(owner_id);
        self.store.count_by_owner(owner_id, &predicate)
    }

    /// Statistics alone, over the owner's full task set.
    pub fn statistics(&self, owner_id: &str) -> Result<TaskStatistics> {
        let everything = self
            .store
            .find_by_owner(owner_id, &Predicate::owner_only(owner_id))?;
        Ok(TaskStatistics::compute(&everything, Utc::now()))
    }
}
