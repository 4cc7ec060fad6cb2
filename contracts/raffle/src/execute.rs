use cosmwasm_std::{
    coins, from_json, to_json_binary, BankMsg, DepsMut, Env, Event, MessageInfo, Reply, Response,
    SubMsg, SubMsgResult, Uint128, Uint256,
};
use raffle_common::types::RafflePhase;

use crate::error::ContractError;
use crate::msg::InstantiateMsg;
use crate::oracle::{first_random_word, request_randomness};
use crate::state::{
    DrawRequest, PayoutContext, RoundResult, CONFIG, PLAYERS, RAFFLE_STATE, ROUNDS,
};
use crate::upkeep::{check_upkeep, winner_index};

pub const PAYOUT_REPLY_ID: u64 = 1;

/// Upper bound on the confirmation depth a raffle may ask for.
const MAX_REQUEST_CONFIRMATIONS: u64 = 200;

/// Reject configurations the raffle could never run with.
pub fn validate_instantiate_msg(msg: &InstantiateMsg) -> Result<(), ContractError> {
    if msg.entrance_fee.is_zero() {
        return Err(ContractError::InvalidConfig {
            reason: "entrance_fee must be non-zero".to_string(),
        });
    }
    if msg.denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom must not be empty".to_string(),
        });
    }
    match hex::decode(&msg.key_hash) {
        Ok(bytes) if bytes.len() == 32 => {}
        _ => {
            return Err(ContractError::InvalidConfig {
                reason: "key_hash must be 32 hex-encoded bytes".to_string(),
            })
        }
    }
    if msg.callback_gas_limit == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "callback_gas_limit must be non-zero".to_string(),
        });
    }
    if msg.num_words == Some(0) {
        return Err(ContractError::InvalidConfig {
            reason: "num_words must be at least 1".to_string(),
        });
    }
    if msg.request_confirmations.unwrap_or(0) > MAX_REQUEST_CONFIRMATIONS {
        return Err(ContractError::InvalidConfig {
            reason: format!("request_confirmations must be at most {MAX_REQUEST_CONFIRMATIONS}"),
        });
    }
    Ok(())
}

/// Enter the current round with at least the entrance fee.
/// Overpayment stays in the pool.
pub fn enter(deps: DepsMut, _env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = RAFFLE_STATE.load(deps.storage)?;

    if state.phase != RafflePhase::Open {
        return Err(ContractError::LotteryNotOpen);
    }

    if info.funds.len() > 1 {
        return Err(ContractError::InvalidFunds);
    }
    let amount = match info.funds.first() {
        Some(coin) if coin.denom != config.denom => {
            return Err(ContractError::WrongDenom {
                expected: config.denom,
                denom: coin.denom.clone(),
            });
        }
        Some(coin) => coin.amount,
        None => Uint128::zero(),
    };

    if amount < config.entrance_fee {
        return Err(ContractError::InsufficientFee {
            required: config.entrance_fee.to_string(),
            sent: amount.to_string(),
        });
    }

    let index = state.num_players;
    PLAYERS.save(deps.storage, (state.round, index), &info.sender)?;
    state.num_players += 1;
    state.pool_balance += amount;
    RAFFLE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "enter")
        .add_attribute("player", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("raffle_entered")
                .add_attribute("player", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("round", state.round.to_string())
                .add_attribute("num_players", state.num_players.to_string()),
        ))
}

/// Close entries and request randomness. Anyone can call.
///
/// The phase change, the request id and the outgoing request are committed
/// together; a rejected request reverts all of them.
pub fn perform_upkeep(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = RAFFLE_STATE.load(deps.storage)?;

    // At most one draw in flight
    if let Some(pending) = &state.pending_request {
        return Err(ContractError::DrawAlreadyInProgress {
            request_id: pending.id.clone(),
        });
    }

    check_upkeep(&state, config.interval_seconds, env.block.time).map_err(|blocker| {
        ContractError::TriggerNotSatisfied {
            blocker,
            pool_balance: state.pool_balance.to_string(),
            num_players: state.num_players,
        }
    })?;

    let request = request_randomness(&config, &env.contract.address, state.request_nonce)?;

    state.phase = RafflePhase::Drawing;
    state.pending_request = Some(DrawRequest {
        id: request.request_id.clone(),
        requested_at: env.block.time,
    });
    state.request_nonce += 1;
    RAFFLE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_message(request.msg)
        .set_data(to_json_binary(&request.request_id)?)
        .add_attribute("action", "perform_upkeep")
        .add_attribute("request_id", request.request_id.clone())
        .add_event(
            Event::new("raffle_draw_started")
                .add_attribute("phase", state.phase.as_str())
                .add_attribute("request_id", request.request_id)
                .add_attribute("round", state.round.to_string())
                .add_attribute("num_players", state.num_players.to_string())
                .add_attribute("pool_balance", state.pool_balance.to_string()),
        ))
}

/// Randomness callback from the coordinator. Picks the winner, pays out the
/// whole pool and reopens the raffle.
///
/// State is reset before the transfer is dispatched. The transfer runs as a
/// submessage whose failure is turned into `PayoutFailed` by `reply`, which
/// reverts this whole step and leaves the draw pending.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: String,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.vrf_coordinator {
        return Err(ContractError::Unauthorized {
            reason: "only the vrf coordinator can fulfill randomness".to_string(),
        });
    }

    let mut state = RAFFLE_STATE.load(deps.storage)?;
    let pending_matches = state.phase == RafflePhase::Drawing
        && state
            .pending_request
            .as_ref()
            .is_some_and(|pending| pending.id == request_id);
    if !pending_matches {
        return Err(ContractError::UnknownRequest { request_id });
    }

    let random_word = first_random_word(&random_words).ok_or(ContractError::NoRandomWords)?;

    let index = winner_index(random_word, state.num_players);
    let winner = PLAYERS.load(deps.storage, (state.round, index))?;
    let amount = state.pool_balance;
    let round = state.round;

    ROUNDS.save(
        deps.storage,
        round,
        &RoundResult {
            round,
            winner: winner.clone(),
            amount,
            num_players: state.num_players,
            request_id: request_id.clone(),
            random_word,
            completed_at: env.block.time,
        },
    )?;

    // Reset: a new round id leaves the player registry empty
    state.round += 1;
    state.num_players = 0;
    state.pool_balance = Uint128::zero();
    state.pending_request = None;
    state.recent_winner = Some(winner.clone());
    state.phase = RafflePhase::Open;
    state.last_draw_time = env.block.time;
    RAFFLE_STATE.save(deps.storage, &state)?;

    let payout = SubMsg::reply_on_error(
        BankMsg::Send {
            to_address: winner.to_string(),
            amount: coins(amount.u128(), &config.denom),
        },
        PAYOUT_REPLY_ID,
    )
    .with_payload(to_json_binary(&PayoutContext {
        winner: winner.clone(),
        amount,
    })?);

    Ok(Response::new()
        .add_submessage(payout)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.clone())
        .add_attribute("winner", winner.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("raffle_winner_picked")
                .add_attribute("phase", state.phase.as_str())
                .add_attribute("winner", winner.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("denom", config.denom)
                .add_attribute("round", round.to_string())
                .add_attribute("request_id", request_id)
                .add_attribute("winner_index", index.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// A failed payout aborts the fulfillment it belongs to.
pub fn handle_payout_reply(msg: Reply) -> Result<Response, ContractError> {
    match msg.result {
        SubMsgResult::Err(reason) => {
            let ctx: PayoutContext = from_json(&msg.payload)?;
            Err(ContractError::PayoutFailed {
                winner: ctx.winner.to_string(),
                amount: ctx.amount.to_string(),
                reason,
            })
        }
        _ => Ok(Response::new()),
    }
}
