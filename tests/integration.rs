//! End-to-end tests for the tracker.
//!
//! Each test drives a [`Tracker`] over a fresh temp directory, so every step
//! goes through a real load → mutate → save cycle on disk.

use todo_rewards::config::Config;
use todo_rewards::error::{LookupError, RewardError, TaskError, TodoError};
use todo_rewards::settlement::Settlement;
use todo_rewards::tracker::{AssumeYes, Confirm, Destructive, Outcome, Tracker};

fn tracker(dir: &std::path::Path) -> Tracker {
    let mut config = Config::default();
    config.storage.todo_file = dir.join("todo.json");
    config.storage.reward_file = dir.join("rewards.json");
    Tracker::new(config)
}

/// Records every prompt and answers with a fixed decision.
struct Scripted {
    answer: bool,
    asked: Vec<String>,
}

impl Scripted {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, action: &Destructive<'_>) -> bool {
        self.asked.push(format!("{action:?}"));
        self.answer
    }
}

fn ids(tracker: &Tracker) -> Vec<u64> {
    tracker
        .tasks()
        .unwrap()
        .tasks()
        .iter()
        .map(|t| t.id.get())
        .collect()
}

#[test]
fn complete_and_undo_round_trips_the_balance() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());

    let task = t.add_task("buy milk", Some(10)).unwrap();
    assert_eq!(task.id.get(), 1);
    assert_eq!(t.tasks().unwrap().next_id(), 2);

    let done = t.complete_task("1").unwrap();
    assert_eq!(done.settlement, Settlement::Credited(10));
    assert_eq!(done.balance, 10);

    let undone = t.uncomplete_task("1").unwrap();
    assert_eq!(undone.settlement, Settlement::Debited(10));
    assert_eq!(undone.balance, 0);
    assert!(!undone.task.is_complete);
    assert!(!undone.task.points_settled);

    // A second completion credits again: the flag was reset by the undo.
    assert_eq!(t.complete_task("1").unwrap().balance, 10);
}

#[test]
fn uncompleting_a_pending_task_fails_cleanly() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", Some(5)).unwrap();

    let err = t.uncomplete_task("1").unwrap_err();
    assert!(matches!(err, TodoError::Task(TaskError::NotComplete { id: 1 })));
    assert_eq!(t.rewards().unwrap().balance(), 0);
}

#[test]
fn restore_brings_back_only_the_last_deletion() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    for text in ["one", "two", "three"] {
        t.add_task(text, None).unwrap();
    }

    t.delete_task("1", &mut AssumeYes).unwrap();
    t.delete_task("3", &mut AssumeYes).unwrap();
    assert_eq!(ids(&t), vec![2]);
    assert_eq!(t.tasks().unwrap().deleted().len(), 2);

    let restored = t.restore_task().unwrap();
    assert_eq!(restored.text, "three");
    assert_eq!(restored.id.get(), 4);
    assert!(!restored.is_complete);
    assert_eq!(ids(&t), vec![2, 4]);
    assert!(t.tasks().unwrap().deleted().is_empty());

    let err = t.restore_task().unwrap_err();
    assert!(matches!(err, TodoError::Task(TaskError::NothingToRestore)));
}

#[test]
fn restored_completed_task_keeps_its_settled_points() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", Some(10)).unwrap();
    t.complete_task("1").unwrap();
    t.delete_task("1", &mut AssumeYes).unwrap();

    let restored = t.restore_task().unwrap();
    assert!(!restored.is_complete);
    assert!(restored.points_settled);

    // Completing it again does not pay twice.
    let done = t.complete_task(&restored.id.to_string()).unwrap();
    assert_eq!(done.settlement, Settlement::Unchanged);
    assert_eq!(done.balance, 10);
}

#[test]
fn complete_then_declined_delete_keeps_completion() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("water plants", Some(3)).unwrap();

    t.complete_task("1").unwrap();
    let mut confirm = Scripted::new(false);
    assert!(t.delete_task("1", &mut confirm).unwrap().is_cancelled());
    assert_eq!(confirm.asked.len(), 1);
    assert!(confirm.asked[0].starts_with("DeleteTask"));

    let ledger = t.tasks().unwrap();
    assert!(ledger.tasks()[0].is_complete);
    assert!(ledger.deleted().is_empty());
    assert_eq!(t.rewards().unwrap().balance(), 3);
}

#[test]
fn complete_delete_then_cancel_delete() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", Some(4)).unwrap();
    t.add_task("b", Some(4)).unwrap();

    t.complete_task("2").unwrap();
    let deleted = t.delete_task("2", &mut AssumeYes).unwrap().done().unwrap();
    assert!(deleted.is_complete);

    let restored = t.restore_task().unwrap();
    assert_eq!(restored.text, "b");
    assert_eq!(restored.id.get(), 3);
    assert_eq!(t.rewards().unwrap().balance(), 4);
}

#[test]
fn purchase_scenario() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("run", Some(20)).unwrap();
    t.complete_task("1").unwrap();
    t.add_reward("cinema", Some(15)).unwrap();
    t.add_reward("holiday", Some(500)).unwrap();

    let listed = t.rewards().unwrap();
    assert_eq!(listed.balance(), 20);
    assert!(listed.rewards()[0].is_available);
    assert!(!listed.rewards()[1].is_available);

    let bought = t.buy_reward("1").unwrap();
    assert_eq!(bought.reward.description, "cinema");
    assert_eq!(bought.balance, 5);

    let err = t.buy_reward("1").unwrap_err();
    match err {
        TodoError::Reward(RewardError::InsufficientPoints {
            shortfall,
            balance,
            price,
        }) => {
            assert_eq!((shortfall, balance, price), (10, 5, 15));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Listing after the purchase recomputes availability and persists it.
    let listed = t.rewards().unwrap();
    assert!(!listed.rewards()[0].is_available);
    assert!(!listed.is_dirty());
}

#[test]
fn price_edit_updates_availability_immediately() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", Some(10)).unwrap();
    t.complete_task("1").unwrap();
    t.add_reward("snack", Some(50)).unwrap();

    let reward = t.edit_reward_price("1", 10).unwrap();
    assert!(reward.is_available);
    let reward = t.edit_reward_description("1", "big snack").unwrap();
    assert_eq!(reward.description, "big snack");
    assert_eq!(reward.price, 10);
}

#[test]
fn clearing_tasks_restarts_numbering() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", None).unwrap();
    t.add_task("b", None).unwrap();

    let mut confirm = Scripted::new(false);
    assert!(t.clear_tasks(&mut confirm).unwrap().is_cancelled());
    assert_eq!(ids(&t), vec![1, 2]);

    assert_eq!(t.clear_tasks(&mut AssumeYes).unwrap(), Outcome::Done(2));
    assert!(t.tasks().unwrap().is_empty());
    assert_eq!(t.add_task("c", None).unwrap().id.get(), 1);
}

#[test]
fn emptied_list_numbers_from_one_and_restore_takes_next_id() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", None).unwrap();
    t.add_task("b", None).unwrap();
    t.delete_task("2", &mut AssumeYes).unwrap();
    t.delete_task("1", &mut AssumeYes).unwrap();

    assert_eq!(t.add_task("c", None).unwrap().id.get(), 1);
    let restored = t.restore_task().unwrap();
    assert_eq!(restored.text, "a");
    assert_eq!(restored.id.get(), 2);
    assert_eq!(ids(&t), vec![1, 2]);
}

#[test]
fn reward_deletion_and_clear() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_reward("a", None).unwrap();
    t.add_reward("b", None).unwrap();

    let removed = t.delete_reward("1", &mut AssumeYes).unwrap().done().unwrap();
    assert_eq!(removed.description, "a");
    assert!(matches!(
        t.buy_reward("1").unwrap_err(),
        TodoError::Lookup(LookupError::NotFound { kind: "reward", id: 1 })
    ));

    assert_eq!(t.clear_rewards(&mut AssumeYes).unwrap(), Outcome::Done(1));
    assert_eq!(t.add_reward("c", Some(1)).unwrap().id.get(), 1);
}

#[test]
fn malformed_ids_are_rejected_before_any_write() {
    let dir = tempfile::TempDir::new().unwrap();
    let t = tracker(dir.path());
    t.add_task("a", None).unwrap();

    for raw in ["0", "-1", "abc", "", "2"] {
        let err = t.complete_task(raw).unwrap_err();
        assert!(
            matches!(err, TodoError::Lookup(LookupError::InvalidId { .. })),
            "{raw:?} gave {err:?}"
        );
    }
    assert!(!t.config().storage.reward_file.exists());
    assert!(!t.tasks().unwrap().tasks()[0].is_complete);
}

#[test]
fn default_points_and_price_come_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.todo_file = dir.path().join("todo.json");
    config.storage.reward_file = dir.path().join("rewards.json");
    config.defaults.task_points = 7;
    config.defaults.reward_price = 70;
    let t = Tracker::new(config);

    assert_eq!(t.add_task("a", None).unwrap().task_points, 7);
    assert_eq!(t.add_reward("b", None).unwrap().price, 70);
}
