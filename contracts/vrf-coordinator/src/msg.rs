use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::state::{CoordinatorConfig, RandomnessRequest, StoredBeacon};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Contracts allowed to request randomness
    pub consumers: Vec<String>,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub quicknet_pubkey_hex: String,
    pub chain_hash: String,
    pub genesis_time: u64,
    pub period_seconds: u64,
    pub max_num_words: u32,
    pub max_callback_gas_limit: u64,
    pub max_request_confirmations: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Request random words. Registered consumers only.
    /// Response data carries the request id.
    RequestRandomWords {
        key_hash: String,
        min_confirmations: u64,
        callback_gas_limit: u64,
        num_words: u32,
    },
    /// Submit a drand beacon for verification and storage. Operators only.
    SubmitBeacon {
        round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Fulfil a pending request from a stored beacon and call back the consumer.
    /// Operators only.
    FulfillRandomWords { request_id: String, round: u64 },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Update consumer list (admin only).
    UpdateConsumers {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(CoordinatorConfig)]
    Config {},

    #[returns(Option<StoredBeacon>)]
    Beacon { round: u64 },

    #[returns(u64)]
    LatestRound {},

    #[returns(Option<RandomnessRequest>)]
    Request { request_id: String },

    /// Number of requests the consumer has issued
    #[returns(u64)]
    ConsumerNonce { consumer: String },
}

/// Parameters of a `RequestRandomWords` call.
pub struct RandomWordsParams {
    pub key_hash: String,
    pub min_confirmations: u64,
    pub callback_gas_limit: u64,
    pub num_words: u32,
}
