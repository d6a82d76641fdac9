//! Rich diagnostic error types for the task-and-reward tracker.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so the command line can tell the user
//! exactly what went wrong. The core never formats user-facing messages itself;
//! it returns these values and the caller renders them.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum TodoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reward(#[from] RewardError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("{} is locked by another process", path.display())]
    #[diagnostic(
        code(todo::store::lock_contention),
        help(
            "Another invocation is reading or writing this file right now. \
             Wait for it to finish and run the command again."
        )
    )]
    LockContention { path: PathBuf },

    #[error("corrupt data in {}: {message}", path.display())]
    #[diagnostic(
        code(todo::store::corrupt),
        help(
            "The file exists but is not a valid document. \
             Fix or remove it by hand; it was left untouched."
        )
    )]
    CorruptData { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(
        code(todo::store::io),
        help(
            "A filesystem operation failed. Check that the directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(todo::store::serde),
        help("The in-memory ledger could not be encoded. This is a bug; please report it.")
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Task ledger errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TaskError {
    #[error("task {id} has already been completed")]
    #[diagnostic(
        code(todo::task::already_complete),
        help("Use `todo not-complete {id}` first if you want to complete it again.")
    )]
    AlreadyComplete { id: u64 },

    #[error("task {id} has not been completed yet")]
    #[diagnostic(
        code(todo::task::not_complete),
        help("Only completed tasks can be marked as not completed.")
    )]
    NotComplete { id: u64 },

    #[error("no deleted tasks to restore")]
    #[diagnostic(
        code(todo::task::nothing_to_restore),
        help("Only the most recent deletion can be undone, and only once.")
    )]
    NothingToRestore,
}

// ---------------------------------------------------------------------------
// Reward ledger errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RewardError {
    #[error("not enough points: {shortfall} more needed (balance {balance}, price {price})")]
    #[diagnostic(
        code(todo::reward::insufficient_points),
        help("Complete more tasks to earn points, then try again.")
    )]
    InsufficientPoints {
        shortfall: i64,
        balance: i64,
        price: u32,
    },
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LookupError {
    #[error("{kind} {id} was not found")]
    #[diagnostic(
        code(todo::lookup::not_found),
        help("The id may belong to an item that was deleted. List current ids with `todo list`.")
    )]
    NotFound { kind: &'static str, id: u64 },

    #[error("incorrect id \"{raw}\"")]
    #[diagnostic(
        code(todo::lookup::invalid_id),
        help("Ids are positive integers no greater than {max}, the highest id issued so far.")
    )]
    InvalidId { raw: String, max: u64 },
}

/// Convenience result type.
pub type TodoResult<T> = std::result::Result<T, TodoError>;
