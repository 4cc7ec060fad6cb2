use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Timestamp, Uint256};
use raffle_common::types::RafflePhase;

use crate::state::RaffleState;

/// The first condition that keeps a draw from starting.
#[cw_serde]
pub enum UpkeepBlocker {
    NotOpen,
    NoPlayers,
    EmptyPool,
    IntervalNotElapsed { remaining_seconds: u64 },
}

impl fmt::Display for UpkeepBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpkeepBlocker::NotOpen => write!(f, "raffle is not open"),
            UpkeepBlocker::NoPlayers => write!(f, "no players entered"),
            UpkeepBlocker::EmptyPool => write!(f, "pool balance is zero"),
            UpkeepBlocker::IntervalNotElapsed { remaining_seconds } => {
                write!(f, "interval not elapsed ({remaining_seconds}s remaining)")
            }
        }
    }
}

/// Whether a draw may start at `now`. Pure; safe to evaluate from queries.
pub fn check_upkeep(
    state: &RaffleState,
    interval_seconds: u64,
    now: Timestamp,
) -> Result<(), UpkeepBlocker> {
    if state.phase != RafflePhase::Open {
        return Err(UpkeepBlocker::NotOpen);
    }
    if state.num_players == 0 {
        return Err(UpkeepBlocker::NoPlayers);
    }
    if state.pool_balance.is_zero() {
        return Err(UpkeepBlocker::EmptyPool);
    }

    // A clock behind the last draw counts as zero elapsed.
    let elapsed = now.seconds().saturating_sub(state.last_draw_time.seconds());
    if elapsed < interval_seconds {
        return Err(UpkeepBlocker::IntervalNotElapsed {
            remaining_seconds: interval_seconds - elapsed,
        });
    }

    Ok(())
}

/// `random_word mod num_players`. Caller guarantees `num_players > 0`.
pub fn winner_index(random_word: Uint256, num_players: u32) -> u32 {
    let rem = random_word % Uint256::from(u128::from(num_players));
    // rem < num_players, so only the low four bytes are set
    let bytes = rem.to_be_bytes();
    u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]])
}
