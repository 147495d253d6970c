//! Task store: the collaborator the query engine reads from.
//!
//! The engine only needs owner-scoped predicate lookups; mutation goes
//! through the same trait so the CLI has one seam. [`FileStore`] keeps a
//! JSON snapshot plus an append-only JSONL change log on disk;
//! [`MemoryStore`] backs tests and embedding.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::query::Predicate;
use crate::storage::Storage;
use crate::task::{Task, TaskPatch};

const TASKS_SCHEMA_VERSION: &str = "td.tasks.v1";

/// Abstract task store. Implementations must answer owner-scoped reads
/// and keep each task visible only to its owner.
pub trait TaskStore {
    /// Tasks belonging to `owner_id` that match `predicate`, in
    /// creation order.
    fn find_by_owner(&self, owner_id: &str, predicate: &Predicate) -> Result<Vec<Task>>;

    /// Count of tasks belonging to `owner_id` that match `predicate`.
    fn count_by_owner(&self, owner_id: &str, predicate: &Predicate) -> Result<u64> {
        Ok(self.find_by_owner(owner_id, predicate)?.len() as u64)
    }

    /// Insert a new task, returning it.
    fn insert(&self, task: Task) -> Result<Task>;

    /// Apply a patch to the owner's task with the given id.
    fn update(&self, owner_id: &str, id: &str, patch: TaskPatch) -> Result<Task>;

    /// Delete the owner's task with the given id.
    fn delete(&self, owner_id: &str, id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Completed,
    Reopened,
    Deleted,
}

/// One entry in the append-only change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_id: String,
    pub task_id: String,
    pub owner_id: String,
    pub kind: ChangeKind,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    fn new(kind: ChangeKind, task: &Task) -> Self {
        Self {
            event_id: Ulid::new().to_string().to_lowercase(),
            task_id: task.id.clone(),
            owner_id: task.owner_id.clone(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// On-disk snapshot of every task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks: Vec::new(),
        }
    }
}

/// File-backed store: `tasks.json` snapshot, `events.jsonl` change log,
/// writer lock on mutations. Reads are lock-free because snapshot
/// writes are atomic.
#[derive(Debug, Clone)]
pub struct FileStore {
    storage: Storage,
}

impl FileStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn load_snapshot(&self) -> Result<TaskSnapshot> {
        let path = self.storage.tasks_file();
        if !path.exists() {
            return Ok(TaskSnapshot::empty());
        }
        self.storage
            .read_json(&path)
            .map_err(|err| Error::StoreUnavailable(format!("{}: {err}", path.display())))
    }

    fn save_snapshot(&self, snapshot: &TaskSnapshot) -> Result<()> {
        self.storage.write_json(&self.storage.tasks_file(), snapshot)
    }

    fn log_event(&self, event: &ChangeEvent) -> Result<()> {
        self.storage.append_jsonl(&self.storage.events_file(), event)
    }

    /// Fetch one task by exact id, owner-scoped.
    pub fn get(&self, owner_id: &str, id: &str) -> Result<Task> {
        let snapshot = self.load_snapshot()?;
        snapshot
            .tasks
            .into_iter()
            .find(|task| task.owner_id == owner_id && task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    /// Resolve an id or unique case-insensitive id prefix to a full id,
    /// considering only the owner's tasks.
    pub fn resolve_id(&self, owner_id: &str, input: &str) -> Result<String> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }

        let snapshot = self.load_snapshot()?;
        let mut matches: Vec<&Task> = snapshot
            .tasks
            .iter()
            .filter(|task| task.owner_id == owner_id && task.id.starts_with(&needle))
            .collect();

        if let Some(exact) = matches.iter().find(|task| task.id == needle) {
            return Ok(exact.id.clone());
        }
        match matches.len() {
            0 => Err(Error::TaskNotFound(input.trim().to_string())),
            1 => Ok(matches.remove(0).id.clone()),
            _ => Err(Error::InvalidArgument(format!(
                "task id '{}' is ambiguous ({} matches)",
                input.trim(),
                matches.len()
            ))),
        }
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut TaskSnapshot) -> Result<T>) -> Result<T> {
        let _lock = FileLock::acquire(self.storage.tasks_lock_file(), DEFAULT_LOCK_TIMEOUT_MS)?;
        let mut snapshot = self.load_snapshot()?;
        let value = op(&mut snapshot)?;
        snapshot.generated_at = Utc::now();
        self.save_snapshot(&snapshot)?;
        Ok(value)
    }
}

impl TaskStore for FileStore {
    fn find_by_owner(&self, owner_id: &str, predicate: &Predicate) -> Result<Vec<Task>> {
        let snapshot = self.load_snapshot()?;
        tracing::debug!(owner = owner_id, tasks = snapshot.tasks.len(), "loaded snapshot");
        Ok(snapshot
            .tasks
            .into_iter()
            .filter(|task| task.owner_id == owner_id && predicate.matches(task))
            .collect())
    }

    fn count_by_owner(&self, owner_id: &str, predicate: &Predicate) -> Result<u64> {
        let snapshot = self.load_snapshot()?;
        Ok(snapshot
            .tasks
            .iter()
            .filter(|task| task.owner_id == owner_id && predicate.matches(task))
            .count() as u64)
    }

    fn insert(&self, task: Task) -> Result<Task> {
        let inserted = self.mutate(|snapshot| {
            snapshot.tasks.push(task.clone());
            Ok(task)
        })?;
        self.log_event(&ChangeEvent::new(ChangeKind::Created, &inserted))?;
        tracing::debug!(task = %inserted.id, "task created");
        Ok(inserted)
    }

    fn update(&self, owner_id: &str, id: &str, patch: TaskPatch) -> Result<Task> {
        let was_completed_toggle = patch.completed;
        let updated = self.mutate(|snapshot| {
            let task = snapshot
                .tasks
                .iter_mut()
                .find(|task| task.owner_id == owner_id && task.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            task.apply(patch)?;
            Ok(task.clone())
        })?;

        let kind = match was_completed_toggle {
            Some(true) => ChangeKind::Completed,
            Some(false) => ChangeKind::Reopened,
            None => ChangeKind::Updated,
        };
        self.log_event(&ChangeEvent::new(kind, &updated))?;
        tracing::debug!(task = %updated.id, ?kind, "task updated");
        Ok(updated)
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        let removed = self.mutate(|snapshot| {
            let position = snapshot
                .tasks
                .iter()
                .position(|task| task.owner_id == owner_id && task.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            Ok(snapshot.tasks.remove(position))
        })?;
        self.log_event(&ChangeEvent::new(ChangeKind::Deleted, &removed))?;
        tracing::debug!(task = %removed.id, "task deleted");
        Ok(())
    }
}

/// In-memory store, used by the engine's tests and embeddable callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    fn find_by_owner(&self, owner_id: &str, predicate: &Predicate) -> Result<Vec<Task>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|_| Error::StoreUnavailable("memory store poisoned".to_string()))?;
        Ok(tasks
            .iter()
            .filter(|task| task.owner_id == owner_id && predicate.matches(task))
            .cloned()
            .collect())
    }

    fn insert(&self, task: Task) -> Result<Task> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| Error::StoreUnavailable("memory store poisoned".to_string()))?;
        tasks.push(task.clone());
        Ok(task)
    }

    fn update(&self, owner_id: &str, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| Error::StoreUnavailable("memory store poisoned".to_string()))?;
        let task = tasks
            .iter_mut()
            .find(|task| task.owner_id == owner_id && task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.apply(patch)?;
        Ok(task.clone())
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| Error::StoreUnavailable("memory store poisoned".to_string()))?;
        let position = tasks
            .iter()
            .position(|task| task.owner_id == owner_id && task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        tasks.remove(position);
        Ok(())
    }
}
