//! Reward ledger: purchasable rewards and the point balance.
//!
//! Each reward caches whether it is affordable. Balance changes only mark the
//! ledger dirty; [`RewardLedger::recompute_all_availability`] refreshes the
//! cache and must run before rewards are shown.

use serde::{Deserialize, Serialize};

use crate::error::RewardError;
use crate::lookup::{Identified, ItemId};
use crate::store::{Document, null_as_empty};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: ItemId,
    pub description: String,
    #[serde(rename = "priceOfReward")]
    pub price: u32,
    /// Cached `balance >= price`; stale while the ledger is dirty.
    pub is_available: bool,
}

impl Identified for Reward {
    const KIND: &'static str = "reward";

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Rewards, balance and id counter.
///
/// Persisted as the reward document (`rewards.json` by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewardLedger {
    #[serde(deserialize_with = "null_as_empty")]
    rewards: Vec<Reward>,
    #[serde(rename = "userPoints")]
    balance: i64,
    #[serde(rename = "isUserPointsUpdate")]
    balance_dirty: bool,
    next_id: u64,
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self {
            rewards: Vec::new(),
            balance: 0,
            balance_dirty: false,
            next_id: 1,
        }
    }
}

impl Document for RewardLedger {
    const NAME: &'static str = "reward system";
}

fn affordable(balance: i64, price: u32) -> bool {
    balance >= i64::from(price)
}

impl RewardLedger {
    /// Rewards in display order. Availability is only trustworthy when
    /// [`is_dirty`](Self::is_dirty) is false.
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Whether availability must be recomputed before the next read.
    pub fn is_dirty(&self) -> bool {
        self.balance_dirty
    }

    pub fn next_id(&self) -> u64 {
        self.next_id.max(1)
    }

    /// Highest id a user may refer to (0 when none).
    pub fn max_issued_id(&self) -> u64 {
        self.next_id().saturating_sub(1).max(self.max_held_id())
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Append a reward priced at `price` and return its id.
    pub fn add(&mut self, description: impl Into<String>, price: u32) -> ItemId {
        if self.rewards.is_empty() {
            self.next_id = 1;
        }
        let raw = self.next_id().max(self.max_held_id() + 1);
        self.next_id = raw + 1;
        let id = ItemId::new(raw).unwrap_or(ItemId::MIN);
        self.rewards.push(Reward {
            id,
            description: description.into(),
            price,
            is_available: affordable(self.balance, price),
        });
        id
    }

    /// Spend `price` points on the reward at `index`.
    ///
    /// On failure nothing changes and the error carries the shortfall.
    pub fn purchase(&mut self, index: usize) -> Result<&Reward, RewardError> {
        let price = self.rewards[index].price;
        if !affordable(self.balance, price) {
            return Err(RewardError::InsufficientPoints {
                shortfall: i64::from(price) - self.balance,
                balance: self.balance,
                price,
            });
        }
        self.balance -= i64::from(price);
        self.balance_dirty = true;
        Ok(&self.rewards[index])
    }

    /// Add `delta` to the balance. A zero delta is a no-op and leaves the
    /// dirty flag alone.
    pub fn adjust_balance(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.balance += delta;
        self.balance_dirty = true;
    }

    pub fn edit_description(&mut self, index: usize, description: impl Into<String>) {
        self.rewards[index].description = description.into();
    }

    /// Change the price and refresh this reward's availability right away.
    pub fn edit_price(&mut self, index: usize, price: u32) {
        let reward = &mut self.rewards[index];
        reward.price = price;
        reward.is_available = affordable(self.balance, price);
    }

    /// Remove the reward at `index`. Rewards cannot be restored.
    pub fn delete(&mut self, index: usize) -> Reward {
        self.rewards.remove(index)
    }

    pub fn recompute_all_availability(&mut self) {
        let balance = self.balance;
        for reward in &mut self.rewards {
            reward.is_available = affordable(balance, reward.price);
        }
        self.balance_dirty = false;
    }

    /// Recompute availability if the ledger is dirty. Returns whether it was,
    /// i.e. whether the ledger now differs from what was loaded.
    pub fn refresh(&mut self) -> bool {
        if !self.balance_dirty {
            return false;
        }
        self.recompute_all_availability();
        true
    }

    pub fn clear_all(&mut self) {
        self.rewards.clear();
        self.next_id = 1;
    }

    pub fn reset_balance(&mut self) {
        self.balance = 0;
        self.balance_dirty = true;
    }

    fn max_held_id(&self) -> u64 {
        self.rewards.iter().map(|r| r.id.get()).max().unwrap_or(0)
    }
}
