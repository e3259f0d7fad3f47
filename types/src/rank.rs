//! The ten-level rank ladder.
//!
//! Ranks are ordinal: `G` is the lowest (index 0) and `SSS` the highest
//! (index 9). Every permission threshold in the engine is expressed as a
//! rank index or an index gap between two members.

use crate::error::ParseRankError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    G,
    F,
    E,
    D,
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    /// Every rank, lowest first.
    pub const ALL: [Rank; 10] = [
        Rank::G,
        Rank::F,
        Rank::E,
        Rank::D,
        Rank::C,
        Rank::B,
        Rank::A,
        Rank::S,
        Rank::SS,
        Rank::SSS,
    ];

    pub const LOWEST: Rank = Rank::G;

    /// Rank assigned to freshly admitted members.
    pub const DEFAULT: Rank = Rank::G;

    /// First rank that may invite or hold proposals ("F").
    pub const INVITE_THRESHOLD: Rank = Rank::F;

    /// First rank that may issue orders ("E").
    pub const ORDER_THRESHOLD: Rank = Rank::E;

    /// Minimum rank-index gap to escalate over another member
    /// (veto, demotion, authority change, promotion ceiling).
    pub const SENIORITY_MARGIN: u8 = 2;

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Rank> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rank::G => "G",
            Rank::F => "F",
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::SS => "SS",
            Rank::SSS => "SSS",
        }
    }

    /// One level down, clamped at the floor.
    pub fn demoted(self) -> Rank {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(Rank::LOWEST)
    }

    /// Whether `self` is at least [`Rank::SENIORITY_MARGIN`] levels above `other`.
    pub fn outranks_by_margin(self, other: Rank) -> bool {
        self.index() >= other.index() + Self::SENIORITY_MARGIN
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRankError(s.to_string()))
    }
}
