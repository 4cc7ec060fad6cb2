use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint256};
use cw_storage_plus::{Item, Map};
use raffle_common::types::RequestStatus;

pub const CONFIG: Item<CoordinatorConfig> = Item::new("config");
pub const BEACONS: Map<u64, StoredBeacon> = Map::new("beacons");
pub const LATEST_ROUND: Item<u64> = Item::new("latest_round");

/// Requests issued per consumer; feeds request id derivation.
pub const NONCES: Map<&Addr, u64> = Map::new("nonces");
pub const REQUESTS: Map<&str, RandomnessRequest> = Map::new("requests");

#[cw_serde]
pub struct CoordinatorConfig {
    pub admin: Addr,
    pub operators: Vec<Addr>,
    /// Contracts allowed to request randomness
    pub consumers: Vec<Addr>,
    /// Quicknet public key, 96 bytes (G2 point)
    pub quicknet_pubkey: Vec<u8>,
    /// Chain hash identifying the drand network
    pub chain_hash: String,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between rounds in seconds (3 for quicknet)
    pub period_seconds: u64,
    pub max_num_words: u32,
    pub max_callback_gas_limit: u64,
    pub max_request_confirmations: u64,
}

impl CoordinatorConfig {
    /// Unix time at which drand publishes `round` (rounds start at 1).
    pub fn round_time(&self, round: u64) -> u64 {
        self.genesis_time
            .saturating_add(round.saturating_sub(1).saturating_mul(self.period_seconds))
    }
}

#[cw_serde]
pub struct StoredBeacon {
    pub round: u64,
    /// sha256(signature), 32 bytes
    pub randomness: Vec<u8>,
    /// BLS signature on G1, 48 bytes
    pub signature: Vec<u8>,
    pub submitted_at: Timestamp,
    pub submitted_by: Addr,
}

#[cw_serde]
pub struct RandomnessRequest {
    pub id: String,
    pub consumer: Addr,
    pub key_hash: String,
    pub num_words: u32,
    pub callback_gas_limit: u64,
    pub min_confirmations: u64,
    pub requested_height: u64,
    pub requested_at: Timestamp,
    pub status: RequestStatus,
    /// Set once fulfilled
    pub drand_round: Option<u64>,
    pub random_words: Option<Vec<Uint256>>,
}
