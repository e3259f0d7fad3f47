//! Pure rank-derived limits.

use guild_types::Rank;

/// `2^rank_index`.
pub fn voting_power_of_rank(rank: Rank) -> u128 {
    1u128 << rank.index()
}

/// Zero below "F", else `2^(rank − F)`.
pub fn invite_allowance_of_rank(rank: Rank) -> u32 {
    match rank.index().checked_sub(Rank::INVITE_THRESHOLD.index()) {
        Some(levels) => 1u32 << levels,
        None => 0,
    }
}

/// Zero below "F", else `rank − F + 1` concurrent proposals.
pub fn proposal_limit_of_rank(rank: Rank) -> u32 {
    match rank.index().checked_sub(Rank::INVITE_THRESHOLD.index()) {
        Some(levels) => u32::from(levels) + 1,
        None => 0,
    }
}

/// Zero below "E", else `2^(rank − E)` concurrent orders.
pub fn order_limit_of_rank(rank: Rank) -> u32 {
    match rank.index().checked_sub(Rank::ORDER_THRESHOLD.index()) {
        Some(levels) => 1u32 << levels,
        None => 0,
    }
}
