// Task store: the ordered task collection and its persistence

use crate::filter::Filter;
use crate::models::{Notification, Task};
use crate::storage::Storage;
use eyre::{Context, Result};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Storage key holding the serialized task collection
pub const TODOS_KEY: &str = "todos";

/// Owns the task collection and is its only mutation surface
///
/// Every mutating operation is followed by a synchronous write of the whole
/// collection under [`TODOS_KEY`]. Write failures are logged and otherwise
/// ignored: the in-memory collection stays authoritative for the session.
pub struct TaskStore {
    storage: Rc<dyn Storage>,
    tasks: Vec<Task>,
    notifications: Vec<Notification>,
    last_write_failed: bool,
}

impl TaskStore {
    /// Hydrate from storage, starting empty if nothing usable is stored
    pub fn load(storage: Rc<dyn Storage>) -> Self {
        let tasks = match Self::read_snapshot(storage.as_ref()) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(key = TODOS_KEY, error = ?e, "Failed to load tasks, starting empty");
                Vec::new()
            }
        };

        info!(count = tasks.len(), "Loaded tasks");

        Self {
            storage,
            tasks,
            notifications: Vec::new(),
            last_write_failed: false,
        }
    }

    fn read_snapshot(storage: &dyn Storage) -> Result<Vec<Task>> {
        match storage.get(TODOS_KEY)? {
            Some(json) => parse_snapshot(&json),
            None => Ok(Vec::new()),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new incomplete task
    ///
    /// Returns `None` without touching anything when the trimmed title is empty.
    pub fn add(&mut self, title: &str) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            debug!("add: ignoring empty title");
            return None;
        }

        let task = Task::new(title);
        debug!(id = %task.id, "add");
        self.tasks.push(task.clone());
        self.persist();
        self.notifications.push(Notification::task_added());

        Some(task)
    }

    /// Flip completion; unknown ids are ignored
    pub fn toggle(&mut self, id: &str) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle: no such task");
            return;
        };

        task.completed = !task.completed;
        self.persist();
    }

    /// Delete a task; unknown ids are ignored
    pub fn remove(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!(id, "remove: no such task");
            return;
        }

        self.persist();
        self.notifications.push(Notification::task_deleted());
    }

    /// Replace a task's details; unknown ids are ignored
    pub fn update_details(&mut self, id: &str, details: &str) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update_details: no such task");
            return;
        };

        task.details = Some(details.to_string());
        self.persist();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tasks matching `filter`, in insertion order
    pub fn list(&self, filter: Filter) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    /// Number of incomplete tasks, whatever filter is being shown
    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Hand queued notifications to the presentation layer
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Whether the most recent write to storage failed
    pub fn last_write_failed(&self) -> bool {
        self.last_write_failed
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize the whole collection
    pub fn snapshot(&self) -> Result<String> {
        serde_json::to_string(&self.tasks).context("Failed to serialize tasks")
    }

    fn persist(&mut self) {
        let result = self
            .snapshot()
            .and_then(|json| self.storage.set(TODOS_KEY, &json));

        match result {
            Ok(()) => {
                self.last_write_failed = false;
                debug!(count = self.tasks.len(), "Persisted tasks");
            }
            Err(e) => {
                self.last_write_failed = true;
                warn!(key = TODOS_KEY, error = ?e, "Failed to persist tasks, keeping in-memory state");
            }
        }
    }
}

/// Parse a stored snapshot, dropping blank titles and later duplicates of an id
pub fn parse_snapshot(json: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(json).context("Failed to parse stored tasks")?;

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(tasks.len());
    for task in tasks {
        if task.title.trim().is_empty() {
            warn!(id = %task.id, "Dropping task with blank title");
            continue;
        }
        if !seen.insert(task.id.clone()) {
            warn!(id = %task.id, "Dropping task with duplicate id");
            continue;
        }
        unique.push(task);
    }

    Ok(unique)
}
