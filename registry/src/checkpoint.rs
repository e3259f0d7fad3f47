//! Append-only checkpoint trails for historical voting power.
//!
//! A trail is a sequence of `(index, value)` pairs with strictly increasing
//! indices. Lookups return the value of the last checkpoint at or before the
//! requested index, found by binary search.

use crate::error::RegistryError;
use guild_types::LedgerIndex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub index: LedgerIndex,
    pub value: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointTrail {
    entries: Vec<Checkpoint>,
}

impl CheckpointTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` at `index`.
    ///
    /// A second write at the last index overwrites it so indices stay strictly
    /// increasing. Writing before the last index is rejected.
    pub fn record(&mut self, index: LedgerIndex, value: u128) -> Result<(), RegistryError> {
        self.check_writable(index)?;
        match self.entries.last_mut() {
            Some(last) if last.index == index => last.value = value,
            _ => self.entries.push(Checkpoint { index, value }),
        }
        Ok(())
    }

    /// Fails if a write at `index` would break monotonicity.
    pub fn check_writable(&self, index: LedgerIndex) -> Result<(), RegistryError> {
        match self.entries.last() {
            Some(last) if index < last.index => Err(RegistryError::NonMonotonicIndex {
                last: last.index,
                index,
            }),
            _ => Ok(()),
        }
    }

    /// Value at or before `index`; zero before the first checkpoint.
    pub fn value_at(&self, index: LedgerIndex) -> u128 {
        let after = self.entries.partition_point(|c| c.index <= index);
        match after {
            0 => 0,
            n => self.entries[n - 1].value,
        }
    }

    /// Most recent value.
    pub fn latest(&self) -> u128 {
        self.entries.last().map(|c| c.value).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_at_or_before() {
        let mut trail = CheckpointTrail::new();
        trail.record(10, 4).unwrap();
        trail.record(20, 8).unwrap();
        trail.record(30, 0).unwrap();

        assert_eq!(trail.value_at(5), 0);
        assert_eq!(trail.value_at(10), 4);
        assert_eq!(trail.value_at(19), 4);
        assert_eq!(trail.value_at(20), 8);
        assert_eq!(trail.value_at(1_000), 0);
        assert_eq!(trail.latest(), 0);
    }

    #[test]
    fn same_index_overwrites() {
        let mut trail = CheckpointTrail::new();
        trail.record(10, 4).unwrap();
        trail.record(10, 16).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.value_at(10), 16);
    }

    #[test]
    fn rejects_going_backwards() {
        let mut trail = CheckpointTrail::new();
        trail.record(10, 4).unwrap();
        assert_eq!(
            trail.record(9, 1),
            Err(RegistryError::NonMonotonicIndex { last: 10, index: 9 })
        );
        assert_eq!(trail.len(), 1);
    }
}
