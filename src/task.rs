//! Task ledger: the active task list plus a one-shot undo buffer.
//!
//! Deleting a task moves it into `deleted`; [`TaskLedger::restore_last`]
//! brings back only the most recent deletion and forgets all the others.
//! Points are never touched here; see [`crate::settlement`].

use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::lookup::{Identified, ItemId};
use crate::store::{Document, null_as_empty};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: ItemId,
    pub text: String,
    pub is_complete: bool,
    /// Points credited to the balance when the task is completed.
    pub task_points: u32,
    /// True once `task_points` for the current completion have been credited.
    #[serde(rename = "isTaskPointsReceive")]
    pub points_settled: bool,
}

impl Identified for Task {
    const KIND: &'static str = "task";

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Ordered task list, deletion buffer and id counter.
///
/// Persisted as the task document (`todo.json` by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskLedger {
    #[serde(deserialize_with = "null_as_empty")]
    tasks: Vec<Task>,
    #[serde(rename = "deletedTasks", deserialize_with = "null_as_empty")]
    deleted: Vec<Task>,
    next_id: u64,
}

impl Default for TaskLedger {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            deleted: Vec::new(),
            next_id: 1,
        }
    }
}

impl Document for TaskLedger {
    const NAME: &'static str = "todo list";
}

impl TaskLedger {
    /// Active tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks deleted since the last restore, oldest first.
    pub fn deleted(&self) -> &[Task] {
        &self.deleted
    }

    /// Id the next added or restored task will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id.max(1)
    }

    /// Highest id a user may refer to (0 when none).
    pub fn max_issued_id(&self) -> u64 {
        self.next_id().saturating_sub(1).max(self.max_active_id())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Mutable access for the settlement bridge.
    pub fn task_mut(&mut self, index: usize) -> &mut Task {
        &mut self.tasks[index]
    }

    /// Append a new pending task and return its id.
    ///
    /// Adding to an empty list restarts numbering at 1.
    pub fn add(&mut self, text: impl Into<String>, points: u32) -> ItemId {
        if self.tasks.is_empty() {
            self.reset_counter();
        }
        let id = self.issue_id();
        self.tasks.push(Task {
            id,
            text: text.into(),
            is_complete: false,
            task_points: points,
            points_settled: false,
        });
        id
    }

    pub fn complete(&mut self, index: usize) -> Result<(), TaskError> {
        let task = &mut self.tasks[index];
        if task.is_complete {
            return Err(TaskError::AlreadyComplete { id: task.id.get() });
        }
        task.is_complete = true;
        Ok(())
    }

    pub fn uncomplete(&mut self, index: usize) -> Result<(), TaskError> {
        let task = &mut self.tasks[index];
        if !task.is_complete {
            return Err(TaskError::NotComplete { id: task.id.get() });
        }
        task.is_complete = false;
        Ok(())
    }

    pub fn edit_text(&mut self, index: usize, text: impl Into<String>) {
        self.tasks[index].text = text.into();
    }

    pub fn edit_points(&mut self, index: usize, points: u32) {
        self.tasks[index].task_points = points;
    }

    /// Move the task at `index` to the end of the deletion buffer.
    pub fn delete(&mut self, index: usize) -> &Task {
        let task = self.tasks.remove(index);
        self.deleted.push(task);
        &self.deleted[self.deleted.len() - 1]
    }

    /// Bring back the most recently deleted task as pending, with a new id.
    ///
    /// Clears the whole deletion buffer: earlier deletions can no longer be
    /// restored afterwards.
    pub fn restore_last(&mut self) -> Result<&Task, TaskError> {
        let mut task = self.deleted.pop().ok_or(TaskError::NothingToRestore)?;
        task.id = self.issue_id();
        task.is_complete = false;
        self.deleted.clear();
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Drop every active task. The deletion buffer is kept.
    pub fn clear_all(&mut self) {
        self.tasks.clear();
        self.reset_counter();
    }

    fn issue_id(&mut self) -> ItemId {
        // A hand-edited counter may lag behind the active ids.
        let raw = self.next_id().max(self.max_active_id() + 1);
        self.next_id = raw + 1;
        ItemId::new(raw).unwrap_or(ItemId::MIN)
    }

    fn reset_counter(&mut self) {
        self.next_id = 1;
    }

    fn max_active_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id.get()).max().unwrap_or(0)
    }
}
