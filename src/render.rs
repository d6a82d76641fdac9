//! Plain-text rendering of ledgers for the terminal.
//!
//! Everything here is pure: functions take read-only ledger data and return
//! strings, leaving the actual printing to the binary.

use std::fmt::Write;

use crate::reward::{Reward, RewardLedger};
use crate::task::Task;
use crate::tracker::Destructive;

/// Column-aligned table, padded with two spaces between columns.
#[derive(Debug, Default)]
struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    fn render(&self) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &self.rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < row.len() {
                    let pad = widths[i] - cell.chars().count() + 2;
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

fn check_mark(task: &Task) -> &'static str {
    if task.is_complete { "✓" } else { " " }
}

/// One-line summary, e.g. `[✓] 3. water plants`.
pub fn task_line(task: &Task) -> String {
    format!("[{}] {}. {}", check_mark(task), task.id, task.text)
}

/// One-line summary, e.g. `2. cinema (15 points)`.
pub fn reward_line(reward: &Reward) -> String {
    format!("{}. {} ({} points)", reward.id, reward.description, reward.price)
}

/// Task list as a table, optionally with the points column.
pub fn task_table(tasks: &[Task], show_points: bool) -> String {
    if tasks.is_empty() {
        return "No tasks, well done!\n".to_string();
    }

    let mut table = Table::default();
    if show_points {
        table.row(["Done", "ID", "Task", "Points"]);
    } else {
        table.row(["Done", "ID", "Task"]);
    }
    for task in tasks {
        let mut cells = vec![
            format!("[{}]", check_mark(task)),
            format!("{}.", task.id),
            task.text.clone(),
        ];
        if show_points {
            cells.push(task.task_points.to_string());
        }
        table.row(cells);
    }
    table.render()
}

/// Balance line followed by the reward table.
///
/// Expects availability to be fresh; see
/// [`RewardLedger::refresh`](crate::reward::RewardLedger::refresh).
pub fn reward_table(ledger: &RewardLedger) -> String {
    let mut out = format!("Your balance of points: {}\n", ledger.balance());
    if ledger.is_empty() {
        out.push_str("No rewards yet.\n");
        return out;
    }

    let mut table = Table::default();
    table.row(["Available", "ID", "Description", "Price"]);
    for reward in ledger.rewards() {
        table.row([
            if reward.is_available { "yes" } else { "no" }.to_string(),
            format!("{}.", reward.id),
            reward.description.clone(),
            reward.price.to_string(),
        ]);
    }
    out.push_str(&table.render());
    out
}

/// Question shown before a destructive action.
pub fn destructive_prompt(action: &Destructive<'_>) -> String {
    let mut out = String::new();
    match action {
        Destructive::DeleteTask(task) if task.is_complete => {
            let _ = writeln!(out, "You want to delete completed task: {}", task_line(task));
        }
        Destructive::DeleteTask(task) => {
            let _ = writeln!(out, "You want to delete task: {}", task_line(task));
        }
        Destructive::ClearTasks { count } => {
            let _ = writeln!(out, "The tasks cannot be restored! ({count} will be removed)");
            out.push_str("Are you sure you want to delete ALL tasks? ");
            return out + "(y/n): ";
        }
        Destructive::DeleteReward(reward) => {
            let _ = writeln!(out, "You want to delete reward: {}", reward_line(reward));
            out.push_str("Rewards cannot be restored. ");
        }
        Destructive::ClearRewards { count } => {
            let _ = writeln!(out, "The rewards cannot be restored! ({count} will be removed)");
            out.push_str("Are you sure you want to delete ALL rewards? ");
            return out + "(y/n): ";
        }
        Destructive::ResetPoints { balance } => {
            let _ = writeln!(out, "Your balance of {balance} points will be set to 0.");
        }
    }
    out.push_str("Are you sure (y/n): ");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskLedger;

    #[test]
    fn empty_task_list_message() {
        assert_eq!(task_table(&[], false), "No tasks, well done!\n");
    }

    #[test]
    fn task_table_aligns_columns() {
        let mut ledger = TaskLedger::default();
        ledger.add("buy milk", 10);
        ledger.add("call mom", 5);
        ledger.complete(1).unwrap();

        let table = task_table(ledger.tasks(), true);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Done  ID  Task      Points");
        assert_eq!(lines[1], "[ ]   1.  buy milk  10");
        assert_eq!(lines[2], "[✓]   2.  call mom  5");
    }

    #[test]
    fn task_table_without_points() {
        let mut ledger = TaskLedger::default();
        ledger.add("a", 10);
        let table = task_table(ledger.tasks(), false);
        assert_eq!(table, "Done  ID  Task\n[ ]   1.  a\n");
    }

    #[test]
    fn reward_table_shows_balance_and_availability() {
        let mut ledger = RewardLedger::default();
        ledger.adjust_balance(20);
        ledger.add("cinema", 15);
        ledger.add("holiday", 500);
        ledger.recompute_all_availability();

        let out = reward_table(&ledger);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Your balance of points: 20");
        assert_eq!(lines[1], "Available  ID  Description  Price");
        assert_eq!(lines[2], "yes        1.  cinema       15");
        assert_eq!(lines[3], "no         2.  holiday      500");
    }

    #[test]
    fn empty_reward_list_still_shows_balance() {
        let out = reward_table(&RewardLedger::default());
        assert_eq!(out, "Your balance of points: 0\nNo rewards yet.\n");
    }

    #[test]
    fn prompts_name_the_action() {
        let mut ledger = TaskLedger::default();
        ledger.add("water plants", 1);
        let prompt = destructive_prompt(&Destructive::DeleteTask(&ledger.tasks()[0]));
        assert!(prompt.starts_with("You want to delete task: [ ] 1. water plants"));
        assert!(prompt.ends_with("(y/n): "));

        let prompt = destructive_prompt(&Destructive::ClearTasks { count: 3 });
        assert!(prompt.contains("ALL tasks"));
        assert!(prompt.ends_with("(y/n): "));
    }
}
