use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};
use raffle_common::types::RafflePhase;

pub const CONFIG: Item<RaffleConfig> = Item::new("config");
pub const RAFFLE_STATE: Item<RaffleState> = Item::new("raffle_state");

/// Player registry: (round, entry index) -> player. A fresh round starts empty.
pub const PLAYERS: Map<(u64, u32), Addr> = Map::new("players");

/// Completed rounds, keyed by round id.
pub const ROUNDS: Map<u64, RoundResult> = Map::new("rounds");

/// Fixed at instantiation for the lifetime of the raffle.
#[cw_serde]
pub struct RaffleConfig {
    pub entrance_fee: Uint128,
    pub denom: String,
    /// Minimum seconds between draws
    pub interval_seconds: u64,
    pub vrf_coordinator: Addr,
    /// Coordinator key hash (hex, 32 bytes)
    pub key_hash: String,
    pub callback_gas_limit: u64,
    /// Blocks the coordinator waits before fulfilling
    pub request_confirmations: u64,
    pub num_words: u32,
}

#[cw_serde]
pub struct RaffleState {
    pub phase: RafflePhase,
    pub round: u64,
    pub num_players: u32,
    /// Sum of all entries accepted this round
    pub pool_balance: Uint128,
    pub last_draw_time: Timestamp,
    /// Set iff phase is Drawing
    pub pending_request: Option<DrawRequest>,
    pub recent_winner: Option<Addr>,
    /// Number of randomness requests issued so far
    pub request_nonce: u64,
}

#[cw_serde]
pub struct DrawRequest {
    pub id: String,
    pub requested_at: Timestamp,
}

#[cw_serde]
pub struct RoundResult {
    pub round: u64,
    pub winner: Addr,
    pub amount: Uint128,
    pub num_players: u32,
    pub request_id: String,
    pub random_word: Uint256,
    pub completed_at: Timestamp,
}

/// Carried through the payout submessage so a failed transfer can be reported.
#[cw_serde]
pub struct PayoutContext {
    pub winner: Addr,
    pub amount: Uint128,
}
