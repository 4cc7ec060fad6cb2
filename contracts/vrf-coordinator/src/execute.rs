use cosmwasm_std::{
    from_json, to_json_binary, Addr, Api, DepsMut, Env, Event, MessageInfo, Reply, Response,
    StdResult, Storage, SubMsg, SubMsgResult, WasmMsg,
};
use raffle_common::types::RequestStatus;
use raffle_common::vrf::{compute_request_id, expand_random_words, VrfConsumerExecuteMsg};

use crate::error::ContractError;
use crate::msg::RandomWordsParams;
use crate::state::{
    RandomnessRequest, StoredBeacon, BEACONS, CONFIG, LATEST_ROUND, NONCES, REQUESTS,
};
use crate::verify::verify_quicknet_beacon;

pub const CALLBACK_REPLY_ID: u64 = 1;
/// Upper bound for `max_request_confirmations`
pub const MAX_REQUEST_CONFIRMATIONS: u64 = 200;

/// Register a randomness request from a consumer contract.
///
/// The id is derived from the consumer's nonce, which advances by one per
/// accepted request.
pub fn request_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: RandomWordsParams,
) -> Result<Response, ContractError> {
    let RandomWordsParams {
        key_hash,
        min_confirmations,
        callback_gas_limit,
        num_words,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    let consumer = info.sender;
    if !config.consumers.contains(&consumer) {
        return Err(ContractError::UnknownConsumer {
            consumer: consumer.to_string(),
        });
    }

    if !matches!(hex::decode(&key_hash), Ok(bytes) if bytes.len() == 32) {
        return Err(ContractError::InvalidRequest {
            reason: "key_hash must be 32 hex-encoded bytes".to_string(),
        });
    }
    if num_words == 0 || num_words > config.max_num_words {
        return Err(ContractError::InvalidRequest {
            reason: format!("num_words must be in 1..={}", config.max_num_words),
        });
    }
    if callback_gas_limit == 0 || callback_gas_limit > config.max_callback_gas_limit {
        return Err(ContractError::InvalidRequest {
            reason: format!(
                "callback_gas_limit must be in 1..={}",
                config.max_callback_gas_limit
            ),
        });
    }
    if min_confirmations > config.max_request_confirmations {
        return Err(ContractError::InvalidRequest {
            reason: format!(
                "min_confirmations must be at most {}",
                config.max_request_confirmations
            ),
        });
    }

    let nonce = NONCES.may_load(deps.storage, &consumer)?.unwrap_or(0);
    let request_id = compute_request_id(&key_hash, consumer.as_str(), nonce);
    NONCES.save(deps.storage, &consumer, &(nonce + 1))?;

    let request = RandomnessRequest {
        id: request_id.clone(),
        consumer: consumer.clone(),
        key_hash,
        num_words,
        callback_gas_limit,
        min_confirmations,
        requested_height: env.block.height,
        requested_at: env.block.time,
        status: RequestStatus::Pending,
        drand_round: None,
        random_words: None,
    };
    REQUESTS.save(deps.storage, &request_id, &request)?;

    Ok(Response::new()
        .set_data(to_json_binary(&request_id)?)
        .add_attribute("action", "request_random_words")
        .add_attribute("request_id", request_id.clone())
        .add_attribute("consumer", consumer.to_string())
        .add_event(
            Event::new("vrf_randomness_requested")
                .add_attribute("request_id", request_id)
                .add_attribute("consumer", consumer.to_string())
                .add_attribute("nonce", nonce.to_string())
                .add_attribute("num_words", num_words.to_string())
                .add_attribute("min_confirmations", min_confirmations.to_string())
                .add_attribute("height", env.block.height.to_string()),
        ))
}

/// Raise `LATEST_ROUND` to `round` if it is newer. Returns the latest round
/// after the update.
fn advance_latest_round(storage: &mut dyn Storage, round: u64) -> StdResult<u64> {
    let latest = LATEST_ROUND.may_load(storage)?.unwrap_or(0);
    if round <= latest {
        return Ok(latest);
    }
    LATEST_ROUND.save(storage, &round)?;
    Ok(round)
}

/// Store a verified beacon so pending requests can be fulfilled from it.
/// Operators only.
///
/// Rounds may arrive out of order; a late older round is stored but leaves
/// the latest round untouched.
pub fn submit_beacon(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can submit beacons".to_string(),
        });
    }
    if BEACONS.has(deps.storage, round) {
        return Err(ContractError::BeaconAlreadyExists { round });
    }

    let signature = hex::decode(&signature_hex).map_err(|_| ContractError::InvalidHex {
        field: "signature_hex".to_string(),
    })?;
    let randomness = verify_quicknet_beacon(&config.quicknet_pubkey, round, &signature)
        .map_err(|e| ContractError::VerificationFailed {
            reason: e.to_string(),
        })?;

    BEACONS.save(
        deps.storage,
        round,
        &StoredBeacon {
            round,
            randomness: randomness.to_vec(),
            signature,
            submitted_at: env.block.time,
            submitted_by: info.sender.clone(),
        },
    )?;
    let latest_round = advance_latest_round(deps.storage, round)?;

    Ok(Response::new()
        .add_attribute("action", "submit_beacon")
        .add_attribute("round", round.to_string())
        .add_attribute("latest_round", latest_round.to_string())
        .add_event(
            Event::new("vrf_beacon_submitted")
                .add_attribute("round", round.to_string())
                .add_attribute("round_time", config.round_time(round).to_string())
                .add_attribute("latest_round", latest_round.to_string())
                .add_attribute("randomness", hex::encode(randomness))
                .add_attribute("submitted_by", info.sender.to_string()),
        ))
}

/// Fulfil a pending request with a stored beacon and call back the consumer.
/// Operators only.
///
/// The beacon round must be published after the request was made, and the
/// request's confirmation depth must have passed. The callback runs as a
/// gas-limited submessage; if it fails, `reply` puts the request back to
/// pending so it can be fulfilled again.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: String,
    round: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can fulfill requests".to_string(),
        });
    }

    let mut request = REQUESTS
        .may_load(deps.storage, &request_id)?
        .ok_or_else(|| ContractError::RequestNotFound {
            request_id: request_id.clone(),
        })?;
    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestNotPending { request_id });
    }

    let required_height = request
        .requested_height
        .saturating_add(request.min_confirmations);
    if env.block.height < required_height {
        return Err(ContractError::InsufficientConfirmations {
            required_height,
            current_height: env.block.height,
        });
    }

    let round_time = config.round_time(round);
    if round_time <= request.requested_at.seconds() {
        return Err(ContractError::RoundTooEarly {
            round,
            round_time,
            requested_at: request.requested_at.seconds(),
        });
    }

    let beacon = BEACONS
        .may_load(deps.storage, round)?
        .ok_or(ContractError::BeaconNotFound { round })?;

    let random_words = expand_random_words(&beacon.randomness, &request_id, request.num_words);

    request.status = RequestStatus::Fulfilled;
    request.drand_round = Some(round);
    request.random_words = Some(random_words.clone());
    REQUESTS.save(deps.storage, &request_id, &request)?;

    let callback = SubMsg::reply_on_error(
        WasmMsg::Execute {
            contract_addr: request.consumer.to_string(),
            msg: to_json_binary(&VrfConsumerExecuteMsg::RawFulfillRandomWords {
                request_id: request_id.clone(),
                random_words,
            })?,
            funds: vec![],
        },
        CALLBACK_REPLY_ID,
    )
    .with_gas_limit(request.callback_gas_limit)
    .with_payload(to_json_binary(&request_id)?);

    Ok(Response::new()
        .add_submessage(callback)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.clone())
        .add_attribute("round", round.to_string())
        .add_event(
            Event::new("vrf_randomness_fulfilled")
                .add_attribute("request_id", request_id)
                .add_attribute("consumer", request.consumer.to_string())
                .add_attribute("drand_round", round.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// A failed consumer callback leaves the request pending for another attempt.
pub fn handle_callback_reply(deps: DepsMut, msg: Reply) -> Result<Response, ContractError> {
    let SubMsgResult::Err(reason) = msg.result else {
        return Ok(Response::new());
    };

    let request_id: String = from_json(&msg.payload)?;
    let mut request = REQUESTS
        .may_load(deps.storage, &request_id)?
        .ok_or_else(|| ContractError::RequestNotFound {
            request_id: request_id.clone(),
        })?;

    request.status = RequestStatus::Pending;
    request.drand_round = None;
    request.random_words = None;
    REQUESTS.save(deps.storage, &request_id, &request)?;

    Ok(Response::new()
        .add_attribute("action", "callback_failed")
        .add_attribute("request_id", request_id.clone())
        .add_event(
            Event::new("vrf_callback_failed")
                .add_attribute("request_id", request_id)
                .add_attribute("consumer", request.consumer.to_string())
                .add_attribute("reason", reason),
        ))
}

fn apply_address_updates(
    api: &dyn Api,
    list: &mut Vec<Addr>,
    add: &[String],
    remove: &[String],
) -> StdResult<()> {
    for addr_str in remove {
        let addr = api.addr_validate(addr_str)?;
        list.retain(|a| *a != addr);
    }
    for addr_str in add {
        let addr = api.addr_validate(addr_str)?;
        if !list.contains(&addr) {
            list.push(addr);
        }
    }
    Ok(())
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    apply_address_updates(deps.api, &mut config.operators, &add, &remove)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}

/// Update the consumer list. Admin only.
pub fn update_consumers(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update consumers".to_string(),
        });
    }

    apply_address_updates(deps.api, &mut config.consumers, &add, &remove)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_consumers")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}
