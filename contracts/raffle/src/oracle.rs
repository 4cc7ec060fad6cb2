use cosmwasm_std::{to_json_binary, Addr, CosmosMsg, StdResult, Uint256, WasmMsg};
use raffle_common::vrf::{compute_request_id, VrfCoordinatorExecuteMsg};

use crate::state::RaffleConfig;

/// An outgoing randomness request and the id the coordinator will assign it.
pub struct RandomnessRequest {
    pub request_id: String,
    pub msg: CosmosMsg,
}

/// Build the `nonce`-th randomness request of `consumer`.
///
/// The coordinator assigns ids from a per-consumer nonce with the shared
/// derivation, so the id is known here without a reply round-trip. The nonce
/// must be advanced in the same step that dispatches `msg`.
pub fn request_randomness(
    config: &RaffleConfig,
    consumer: &Addr,
    nonce: u64,
) -> StdResult<RandomnessRequest> {
    let request_id = compute_request_id(&config.key_hash, consumer.as_str(), nonce);

    let msg = WasmMsg::Execute {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&VrfCoordinatorExecuteMsg::RequestRandomWords {
            key_hash: config.key_hash.clone(),
            min_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: config.num_words,
        })?,
        funds: vec![],
    };

    Ok(RandomnessRequest {
        request_id,
        msg: msg.into(),
    })
}

/// The word used for winner selection; extra words are ignored.
pub fn first_random_word(random_words: &[Uint256]) -> Option<Uint256> {
    random_words.first().copied()
}
