// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # todo-rewards
//!
//! A command-line task list that pays out points, and a reward shop to spend
//! them in.
//!
//! ## Architecture
//!
//! - **Record store** (`store`): JSON documents behind advisory sidecar locks,
//!   replaced atomically via temp file + rename
//! - **Task ledger** (`task`): tasks, monotonic ids, one-shot delete/undo buffer
//! - **Reward ledger** (`reward`): rewards, point balance, cached availability
//! - **Settlement** (`settlement`): credits or debits points once per completion
//! - **Tracker** (`tracker`): load → mutate → save for each user operation
//!
//! ## Library usage
//!
//! ```no_run
//! use todo_rewards::config::Config;
//! use todo_rewards::tracker::Tracker;
//!
//! let tracker = Tracker::new(Config::default());
//! let task = tracker.add_task("buy milk", Some(10)).unwrap();
//! let done = tracker.complete_task(&task.id.to_string()).unwrap();
//! assert_eq!(done.balance, 10);
//! ```

pub mod config;
pub mod error;
pub mod lookup;
pub mod render;
pub mod reward;
pub mod settlement;
pub mod store;
pub mod task;
pub mod tracker;
