pub mod contract;
pub mod error;
pub mod execute;
pub mod msg;
pub mod oracle;
pub mod query;
pub mod state;
pub mod upkeep;

pub use crate::error::ContractError;
