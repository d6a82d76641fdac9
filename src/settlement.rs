//! Cross-ledger point settlement.
//!
//! Completing a task credits its points to the reward balance, undoing the
//! completion debits them again. The task's `points_settled` flag gates both
//! directions, so repeated completion edges never credit twice.
//!
//! The two ledgers live in separate files and are saved one after the other
//! (tasks first); a crash in between leaves them out of step.

use crate::reward::RewardLedger;
use crate::task::Task;

/// Balance effect of one settlement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Credited(u32),
    Debited(u32),
    /// Flag already in the requested state; balance untouched.
    Unchanged,
}

impl Settlement {
    /// Signed balance change.
    pub fn delta(self) -> i64 {
        match self {
            Settlement::Credited(p) => i64::from(p),
            Settlement::Debited(p) => -i64::from(p),
            Settlement::Unchanged => 0,
        }
    }

    /// Whether the reward ledger needs saving.
    pub fn changes_balance(self) -> bool {
        self.delta() != 0
    }
}

/// Credit `task.task_points` unless they were already credited.
pub fn settle_completion(task: &mut Task, rewards: &mut RewardLedger) -> Settlement {
    if task.points_settled {
        return Settlement::Unchanged;
    }
    rewards.adjust_balance(i64::from(task.task_points));
    task.points_settled = true;
    Settlement::Credited(task.task_points)
}

/// Debit `task.task_points` if they were credited earlier.
pub fn revoke_completion(task: &mut Task, rewards: &mut RewardLedger) -> Settlement {
    if !task.points_settled {
        return Settlement::Unchanged;
    }
    rewards.adjust_balance(-i64::from(task.task_points));
    task.points_settled = false;
    Settlement::Debited(task.task_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskLedger;

    #[test]
    fn buy_milk_scenario() {
        let mut tasks = TaskLedger::default();
        let mut rewards = RewardLedger::default();

        let id = tasks.add("buy milk", 10);
        assert_eq!(id.get(), 1);
        assert_eq!(tasks.next_id(), 2);

        tasks.complete(0).unwrap();
        let task = tasks.task_mut(0);
        assert_eq!(settle_completion(task, &mut rewards), Settlement::Credited(10));
        assert!(task.points_settled);
        assert_eq!(rewards.balance(), 10);

        tasks.uncomplete(0).unwrap();
        let task = tasks.task_mut(0);
        assert!(!task.is_complete);
        assert_eq!(revoke_completion(task, &mut rewards), Settlement::Debited(10));
        assert!(!task.points_settled);
        assert_eq!(rewards.balance(), 0);
    }

    #[test]
    fn repeated_settlement_credits_once() {
        let mut tasks = TaskLedger::default();
        let mut rewards = RewardLedger::default();
        tasks.add("a", 7);
        tasks.complete(0).unwrap();

        let task = tasks.task_mut(0);
        assert_eq!(settle_completion(task, &mut rewards), Settlement::Credited(7));
        for _ in 0..3 {
            assert_eq!(settle_completion(task, &mut rewards), Settlement::Unchanged);
        }
        assert_eq!(rewards.balance(), 7);
    }

    #[test]
    fn revoke_without_credit_is_noop() {
        let mut tasks = TaskLedger::default();
        let mut rewards = RewardLedger::default();
        tasks.add("a", 7);
        let task = tasks.task_mut(0);
        assert_eq!(revoke_completion(task, &mut rewards), Settlement::Unchanged);
        assert_eq!(rewards.balance(), 0);
        assert!(!rewards.is_dirty());
    }

    #[test]
    fn zero_point_task_settles_without_dirtying() {
        let mut tasks = TaskLedger::default();
        let mut rewards = RewardLedger::default();
        tasks.add("free", 0);
        let task = tasks.task_mut(0);
        let outcome = settle_completion(task, &mut rewards);
        assert_eq!(outcome, Settlement::Credited(0));
        assert!(!outcome.changes_balance());
        assert!(task.points_settled);
        assert!(!rewards.is_dirty());
    }

    #[test]
    fn debit_may_take_balance_negative() {
        let mut tasks = TaskLedger::default();
        let mut rewards = RewardLedger::default();
        tasks.add("a", 10);
        rewards.add("treat", 10);

        let task = tasks.task_mut(0);
        settle_completion(task, &mut rewards);
        rewards.purchase(0).unwrap();
        revoke_completion(task, &mut rewards);
        assert_eq!(rewards.balance(), -10);
    }

    #[test]
    fn delta_signs() {
        assert_eq!(Settlement::Credited(4).delta(), 4);
        assert_eq!(Settlement::Debited(4).delta(), -4);
        assert_eq!(Settlement::Unchanged.delta(), 0);
    }
}
