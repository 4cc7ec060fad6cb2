use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};
use raffle_common::types::RafflePhase;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, DEFAULT_NUM_WORDS,
    DEFAULT_REQUEST_CONFIRMATIONS,
};
use crate::query;
use crate::state::{RaffleConfig, RaffleState, CONFIG, RAFFLE_STATE};

const CONTRACT_NAME: &str = "crates.io:raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    execute::validate_instantiate_msg(&msg)?;

    let config = RaffleConfig {
        entrance_fee: msg.entrance_fee,
        denom: msg.denom,
        interval_seconds: msg.interval_seconds,
        vrf_coordinator: deps.api.addr_validate(&msg.vrf_coordinator)?,
        key_hash: msg.key_hash.to_lowercase(),
        callback_gas_limit: msg.callback_gas_limit,
        request_confirmations: msg
            .request_confirmations
            .unwrap_or(DEFAULT_REQUEST_CONFIRMATIONS),
        num_words: msg.num_words.unwrap_or(DEFAULT_NUM_WORDS),
    };
    CONFIG.save(deps.storage, &config)?;

    let state = RaffleState {
        phase: RafflePhase::Open,
        round: 0,
        num_players: 0,
        pool_balance: Uint128::zero(),
        last_draw_time: env.block.time,
        pending_request: None,
        recent_winner: None,
        request_nonce: 0,
    };
    RAFFLE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "raffle")
        .add_attribute("entrance_fee", config.entrance_fee.to_string())
        .add_attribute("interval_seconds", config.interval_seconds.to_string())
        .add_attribute("creator", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Enter {} => execute::enter(deps, env, info),
        ExecuteMsg::PerformUpkeep {} => execute::perform_upkeep(deps, env, info),
        ExecuteMsg::RawFulfillRandomWords {
            request_id,
            random_words,
        } => execute::fulfill_random_words(deps, env, info, request_id, random_words),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::RaffleState {} => query::query_raffle_state(deps),
        QueryMsg::CheckUpkeep {} => query::query_check_upkeep(deps, env),
        QueryMsg::Player { index } => query::query_player(deps, index),
        QueryMsg::Players { start_after, limit } => query::query_players(deps, start_after, limit),
        QueryMsg::NumberOfPlayers {} => query::query_number_of_players(deps),
        QueryMsg::RecentWinner {} => query::query_recent_winner(deps),
        QueryMsg::Round { round } => query::query_round(deps, round),
        QueryMsg::RoundHistory { start_after, limit } => {
            query::query_round_history(deps, start_after, limit)
        }
    }
}

#[entry_point]
pub fn reply(_deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        execute::PAYOUT_REPLY_ID => execute::handle_payout_reply(msg),
        id => Err(ContractError::Std(cosmwasm_std::StdError::generic_err(format!(
            "unknown reply id {id}"
        )))),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
