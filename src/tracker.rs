//! Load → mutate → save orchestration for every tracker command.
//!
//! Each [`Tracker`] method reloads the ledgers it needs from the store, applies
//! exactly one mutation and persists the result, so concurrent invocations only
//! ever meet at the store's file locks. Destructive methods ask a [`Confirm`]
//! implementation first and return [`Outcome::Cancelled`] without touching disk
//! when it declines.

use std::path::Path;

use crate::config::Config;
use crate::error::TodoResult;
use crate::lookup::{resolve_id, validate_id};
use crate::reward::{Reward, RewardLedger};
use crate::settlement::{Settlement, revoke_completion, settle_completion};
use crate::store;
use crate::task::{Task, TaskLedger};

/// A destructive action awaiting the user's decision.
#[derive(Debug, Clone, Copy)]
pub enum Destructive<'a> {
    DeleteTask(&'a Task),
    ClearTasks { count: usize },
    DeleteReward(&'a Reward),
    ClearRewards { count: usize },
    ResetPoints { balance: i64 },
}

/// Decides whether a destructive action may proceed.
pub trait Confirm {
    fn confirm(&mut self, action: &Destructive<'_>) -> bool;
}

/// Approves everything (`--force`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _action: &Destructive<'_>) -> bool {
        true
    }
}

/// Result of a confirmable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Cancelled => None,
        }
    }
}

/// A completion toggle and its effect on the balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: Task,
    pub settlement: Settlement,
    pub balance: i64,
}

/// A successful reward purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub reward: Reward,
    pub balance: i64,
}

/// Entry point for all tracker operations, bound to one configuration.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: Config,
}

impl Tracker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn todo_file(&self) -> &Path {
        &self.config.storage.todo_file
    }

    fn reward_file(&self) -> &Path {
        &self.config.storage.reward_file
    }

    fn load_tasks(&self) -> TodoResult<TaskLedger> {
        Ok(store::load(self.todo_file())?)
    }

    fn save_tasks(&self, ledger: &TaskLedger) -> TodoResult<()> {
        Ok(store::save(self.todo_file(), ledger)?)
    }

    fn load_rewards(&self) -> TodoResult<RewardLedger> {
        Ok(store::load(self.reward_file())?)
    }

    fn save_rewards(&self, ledger: &RewardLedger) -> TodoResult<()> {
        Ok(store::save(self.reward_file(), ledger)?)
    }

    /// Save a settled task ledger, then the reward ledger if its balance moved.
    ///
    /// When the reward save fails the task file is put back to `loaded`, so
    /// the settled flag never lands on disk without its points.
    fn save_settled(
        &self,
        loaded: &TaskLedger,
        tasks: &TaskLedger,
        rewards: &RewardLedger,
        settlement: Settlement,
    ) -> TodoResult<()> {
        self.save_tasks(tasks)?;
        if !settlement.changes_balance() {
            return Ok(());
        }
        if let Err(err) = self.save_rewards(rewards) {
            match self.save_tasks(loaded) {
                Ok(()) => tracing::warn!(error = %err, "reward save failed, task change rolled back"),
                Err(rollback) => tracing::error!(
                    error = %err,
                    rollback = %rollback,
                    "reward save failed and task file could not be rolled back"
                ),
            }
            return Err(err);
        }
        Ok(())
    }

    /// Resolve user id text against the task ledger.
    fn task_index(ledger: &TaskLedger, raw_id: &str) -> TodoResult<usize> {
        let id = validate_id(raw_id, ledger.max_issued_id())?;
        Ok(resolve_id(id, ledger.tasks())?)
    }

    fn reward_index(ledger: &RewardLedger, raw_id: &str) -> TodoResult<usize> {
        let id = validate_id(raw_id, ledger.max_issued_id())?;
        Ok(resolve_id(id, ledger.rewards())?)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Add a task; `points` falls back to the configured default.
    pub fn add_task(&self, text: &str, points: Option<u32>) -> TodoResult<Task> {
        let mut ledger = self.load_tasks()?;
        let points = points.unwrap_or(self.config.defaults.task_points);
        let id = ledger.add(text, points);
        self.save_tasks(&ledger)?;
        tracing::info!(task_id = id.get(), points, "task added");
        Ok(ledger.tasks()[ledger.len() - 1].clone())
    }

    /// Current task ledger, read-only.
    pub fn tasks(&self) -> TodoResult<TaskLedger> {
        self.load_tasks()
    }

    /// Mark a task complete and credit its points once.
    ///
    /// The task file is saved before the reward file.
    pub fn complete_task(&self, raw_id: &str) -> TodoResult<Completion> {
        let mut tasks = self.load_tasks()?;
        let mut rewards = self.load_rewards()?;
        let index = Self::task_index(&tasks, raw_id)?;

        let loaded = tasks.clone();
        tasks.complete(index)?;
        let task = tasks.task_mut(index);
        let settlement = settle_completion(task, &mut rewards);
        let task = task.clone();

        self.save_settled(&loaded, &tasks, &rewards, settlement)?;
        tracing::info!(task_id = task.id.get(), ?settlement, "task completed");
        Ok(Completion {
            task,
            settlement,
            balance: rewards.balance(),
        })
    }

    /// Mark a task not complete and take back credited points.
    ///
    /// Saves in the same order as [`complete_task`](Self::complete_task).
    pub fn uncomplete_task(&self, raw_id: &str) -> TodoResult<Completion> {
        let mut tasks = self.load_tasks()?;
        let mut rewards = self.load_rewards()?;
        let index = Self::task_index(&tasks, raw_id)?;

        let loaded = tasks.clone();
        tasks.uncomplete(index)?;
        let task = tasks.task_mut(index);
        let settlement = revoke_completion(task, &mut rewards);
        let task = task.clone();

        self.save_settled(&loaded, &tasks, &rewards, settlement)?;
        tracing::info!(task_id = task.id.get(), ?settlement, "task marked not completed");
        Ok(Completion {
            task,
            settlement,
            balance: rewards.balance(),
        })
    }

    pub fn edit_task_text(&self, raw_id: &str, text: &str) -> TodoResult<Task> {
        let mut ledger = self.load_tasks()?;
        let index = Self::task_index(&ledger, raw_id)?;
        ledger.edit_text(index, text);
        self.save_tasks(&ledger)?;
        let task = ledger.tasks()[index].clone();
        tracing::info!(task_id = task.id.get(), "task text changed");
        Ok(task)
    }

    pub fn edit_task_points(&self, raw_id: &str, points: u32) -> TodoResult<Task> {
        let mut ledger = self.load_tasks()?;
        let index = Self::task_index(&ledger, raw_id)?;
        ledger.edit_points(index, points);
        self.save_tasks(&ledger)?;
        let task = ledger.tasks()[index].clone();
        tracing::info!(task_id = task.id.get(), points, "task points changed");
        Ok(task)
    }

    /// Move a task to the deletion buffer, where `restore_task` can find it.
    pub fn delete_task(&self, raw_id: &str, confirm: &mut dyn Confirm) -> TodoResult<Outcome<Task>> {
        let mut ledger = self.load_tasks()?;
        let index = Self::task_index(&ledger, raw_id)?;
        if !confirm.confirm(&Destructive::DeleteTask(&ledger.tasks()[index])) {
            tracing::info!("deletion cancelled by user");
            return Ok(Outcome::Cancelled);
        }
        let task = ledger.delete(index).clone();
        self.save_tasks(&ledger)?;
        tracing::info!(task_id = task.id.get(), "task deleted");
        Ok(Outcome::Done(task))
    }

    /// Undo the most recent deletion. The task returns pending, with a new id.
    pub fn restore_task(&self) -> TodoResult<Task> {
        let mut ledger = self.load_tasks()?;
        let task = ledger.restore_last()?.clone();
        self.save_tasks(&ledger)?;
        tracing::info!(task_id = task.id.get(), "task restored with new id");
        Ok(task)
    }

    /// Remove every active task. Returns how many were removed.
    pub fn clear_tasks(&self, confirm: &mut dyn Confirm) -> TodoResult<Outcome<usize>> {
        let mut ledger = self.load_tasks()?;
        let count = ledger.len();
        if !confirm.confirm(&Destructive::ClearTasks { count }) {
            tracing::info!("clearing tasks cancelled by user");
            return Ok(Outcome::Cancelled);
        }
        ledger.clear_all();
        self.save_tasks(&ledger)?;
        tracing::info!(count, "all tasks removed");
        Ok(Outcome::Done(count))
    }

    // -----------------------------------------------------------------------
    // Rewards
    // -----------------------------------------------------------------------

    /// Add a reward; `price` falls back to the configured default.
    pub fn add_reward(&self, description: &str, price: Option<u32>) -> TodoResult<Reward> {
        let mut ledger = self.load_rewards()?;
        let price = price.unwrap_or(self.config.defaults.reward_price);
        let id = ledger.add(description, price);
        self.save_rewards(&ledger)?;
        tracing::info!(reward_id = id.get(), price, "reward added");
        Ok(ledger.rewards()[ledger.len() - 1].clone())
    }

    /// Reward ledger with availability brought up to date.
    ///
    /// Saves the refreshed ledger back only if it was stale.
    pub fn rewards(&self) -> TodoResult<RewardLedger> {
        let mut ledger = self.load_rewards()?;
        if ledger.refresh() {
            self.save_rewards(&ledger)?;
            tracing::debug!(balance = ledger.balance(), "reward availability recomputed");
        }
        Ok(ledger)
    }

    pub fn buy_reward(&self, raw_id: &str) -> TodoResult<Purchase> {
        let mut ledger = self.load_rewards()?;
        let index = Self::reward_index(&ledger, raw_id)?;
        let reward = ledger.purchase(index)?.clone();
        self.save_rewards(&ledger)?;
        tracing::info!(reward_id = reward.id.get(), balance = ledger.balance(), "reward purchased");
        Ok(Purchase {
            reward,
            balance: ledger.balance(),
        })
    }

    pub fn edit_reward_description(&self, raw_id: &str, description: &str) -> TodoResult<Reward> {
        let mut ledger = self.load_rewards()?;
        let index = Self::reward_index(&ledger, raw_id)?;
        ledger.edit_description(index, description);
        self.save_rewards(&ledger)?;
        let reward = ledger.rewards()[index].clone();
        tracing::info!(reward_id = reward.id.get(), "reward description changed");
        Ok(reward)
    }

    pub fn edit_reward_price(&self, raw_id: &str, price: u32) -> TodoResult<Reward> {
        let mut ledger = self.load_rewards()?;
        let index = Self::reward_index(&ledger, raw_id)?;
        ledger.edit_price(index, price);
        self.save_rewards(&ledger)?;
        let reward = ledger.rewards()[index].clone();
        tracing::info!(reward_id = reward.id.get(), price, "reward price changed");
        Ok(reward)
    }

    /// Permanently remove a reward.
    pub fn delete_reward(
        &self,
        raw_id: &str,
        confirm: &mut dyn Confirm,
    ) -> TodoResult<Outcome<Reward>> {
        let mut ledger = self.load_rewards()?;
        let index = Self::reward_index(&ledger, raw_id)?;
        if !confirm.confirm(&Destructive::DeleteReward(&ledger.rewards()[index])) {
            tracing::info!("reward deletion cancelled by user");
            return Ok(Outcome::Cancelled);
        }
        let reward = ledger.delete(index);
        self.save_rewards(&ledger)?;
        tracing::info!(reward_id = reward.id.get(), "reward deleted");
        Ok(Outcome::Done(reward))
    }

    pub fn clear_rewards(&self, confirm: &mut dyn Confirm) -> TodoResult<Outcome<usize>> {
        let mut ledger = self.load_rewards()?;
        let count = ledger.len();
        if !confirm.confirm(&Destructive::ClearRewards { count }) {
            tracing::info!("clearing rewards cancelled by user");
            return Ok(Outcome::Cancelled);
        }
        ledger.clear_all();
        self.save_rewards(&ledger)?;
        tracing::info!(count, "all rewards removed");
        Ok(Outcome::Done(count))
    }

    /// Zero the balance. Returns the balance it had before.
    pub fn reset_points(&self, confirm: &mut dyn Confirm) -> TodoResult<Outcome<i64>> {
        let mut ledger = self.load_rewards()?;
        let balance = ledger.balance();
        if !confirm.confirm(&Destructive::ResetPoints { balance }) {
            tracing::info!("points reset cancelled by user");
            return Ok(Outcome::Cancelled);
        }
        ledger.reset_balance();
        self.save_rewards(&ledger)?;
        tracing::info!(previous = balance, "balance reset to zero");
        Ok(Outcome::Done(balance))
    }
}
