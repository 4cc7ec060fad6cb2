use cosmwasm_std::StdError;
use thiserror::Error;

use crate::upkeep::UpkeepBlocker;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("insufficient entrance fee: need {required}, sent {sent}")]
    InsufficientFee { required: String, sent: String },

    #[error("lottery is not open")]
    LotteryNotOpen,

    #[error("send exactly one coin to enter")]
    InvalidFunds,

    #[error("wrong denom: expected {expected}, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("upkeep not needed: {blocker} (pool balance: {pool_balance}, players: {num_players})")]
    TriggerNotSatisfied {
        blocker: UpkeepBlocker,
        pool_balance: String,
        num_players: u32,
    },

    #[error("draw already in progress (request {request_id})")]
    DrawAlreadyInProgress { request_id: String },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: String },

    #[error("fulfillment carried no random words")]
    NoRandomWords,

    #[error("payout of {amount} to {winner} failed: {reason}")]
    PayoutFailed {
        winner: String,
        amount: String,
        reason: String,
    },
}
