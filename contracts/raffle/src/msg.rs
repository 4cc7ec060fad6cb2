use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128, Uint256};

use crate::state::{RaffleConfig, RaffleState, RoundResult};
use crate::upkeep::UpkeepBlocker;

pub const DEFAULT_REQUEST_CONFIRMATIONS: u64 = 3;
pub const DEFAULT_NUM_WORDS: u32 = 1;

#[cw_serde]
pub struct InstantiateMsg {
    /// Minimum amount of `denom` a single entry must carry
    pub entrance_fee: Uint128,
    pub denom: String,
    pub interval_seconds: u64,
    pub vrf_coordinator: String,
    /// Hex-encoded 32-byte key hash (64 hex chars)
    pub key_hash: String,
    pub callback_gas_limit: u64,
    pub request_confirmations: Option<u64>,
    pub num_words: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Enter the current round. Send at least the entrance fee.
    Enter {},
    /// Close entries and request randomness. Anyone can call once upkeep is needed.
    PerformUpkeep {},
    /// Randomness callback. Only the VRF coordinator can call.
    RawFulfillRandomWords {
        request_id: String,
        random_words: Vec<Uint256>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RaffleConfig)]
    Config {},
    #[returns(RaffleState)]
    RaffleState {},
    #[returns(CheckUpkeepResponse)]
    CheckUpkeep {},
    #[returns(Addr)]
    Player { index: u32 },
    #[returns(PlayersResponse)]
    Players {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(u32)]
    NumberOfPlayers {},
    #[returns(Option<Addr>)]
    RecentWinner {},
    #[returns(Option<RoundResult>)]
    Round { round: u64 },
    #[returns(RoundHistoryResponse)]
    RoundHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct CheckUpkeepResponse {
    pub upkeep_needed: bool,
    /// First unmet condition when upkeep is not needed
    pub blocker: Option<UpkeepBlocker>,
    pub reason: Option<String>,
}

#[cw_serde]
pub struct PlayersResponse {
    pub round: u64,
    pub players: Vec<Addr>,
}

#[cw_serde]
pub struct RoundHistoryResponse {
    pub rounds: Vec<RoundResult>,
}
