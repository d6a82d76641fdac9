//! Item identifiers and id → index resolution.
//!
//! Tasks and rewards are addressed by a public [`ItemId`]; ledger operations
//! work on positions in the active list. [`validate_id`] turns user text into
//! an id and [`resolve_id`] finds its position, generically over any item that
//! implements [`Identified`].

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Public identifier of a task or reward.
///
/// Uses `NonZeroU64` so that a zero id can never be constructed or loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ItemId(NonZeroU64);

impl ItemId {
    /// The smallest valid id, `1`.
    pub const MIN: ItemId = ItemId(NonZeroU64::MIN);

    /// Create an `ItemId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(ItemId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything stored in a ledger and addressed by id.
pub trait Identified {
    /// Singular noun used in error messages ("task", "reward").
    const KIND: &'static str;

    fn id(&self) -> ItemId;
}

/// Find the position of the item with `id`.
///
/// Collections are small, human-curated lists, so this is a linear scan.
pub fn resolve_id<T: Identified>(id: ItemId, items: &[T]) -> Result<usize, LookupError> {
    items
        .iter()
        .position(|item| item.id() == id)
        .ok_or(LookupError::NotFound {
            kind: T::KIND,
            id: id.get(),
        })
}

/// Parse user-supplied id text.
///
/// The upper bound is the highest id ever issued, not the number of active
/// items: an id that was deleted still passes here and fails in [`resolve_id`].
pub fn validate_id(raw: &str, max_issued: u64) -> Result<ItemId, LookupError> {
    let invalid = || LookupError::InvalidId {
        raw: raw.to_string(),
        max: max_issued,
    };
    let value: u64 = raw.trim().parse().map_err(|_| invalid())?;
    if value > max_issued {
        return Err(invalid());
    }
    ItemId::new(value).ok_or_else(invalid)
}
