pub mod types;
pub mod vrf;

pub use types::{RafflePhase, RequestStatus};
pub use vrf::{
    compute_request_id, expand_random_words, VrfConsumerExecuteMsg, VrfCoordinatorExecuteMsg,
};
