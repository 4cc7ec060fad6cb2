use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("beacon for round {round} already exists")]
    BeaconAlreadyExists { round: u64 },

    #[error("BLS verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("beacon not found for round {round}")]
    BeaconNotFound { round: u64 },

    #[error("invalid pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("{consumer} is not a registered consumer")]
    UnknownConsumer { consumer: String },

    #[error("invalid randomness request: {reason}")]
    InvalidRequest { reason: String },

    #[error("randomness request {request_id} not found")]
    RequestNotFound { request_id: String },

    #[error("randomness request {request_id} is not pending")]
    RequestNotPending { request_id: String },

    #[error("request needs block {required_height}, current block is {current_height}")]
    InsufficientConfirmations {
        required_height: u64,
        current_height: u64,
    },

    #[error("round {round} was published at {round_time}, not after the request at {requested_at}")]
    RoundTooEarly {
        round: u64,
        round_time: u64,
        requested_at: u64,
    },
}
