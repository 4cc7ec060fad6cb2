use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdError, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, RandomWordsParams};
use crate::query;
use crate::state::{CoordinatorConfig, CONFIG, LATEST_ROUND};

const CONTRACT_NAME: &str = "crates.io:raffle-vrf-coordinator";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let pubkey_bytes = hex::decode(&msg.quicknet_pubkey_hex).map_err(|_| {
        ContractError::InvalidHex {
            field: "quicknet_pubkey_hex".to_string(),
        }
    })?;
    if pubkey_bytes.len() != 96 {
        return Err(ContractError::InvalidPubkeyLength {
            got: pubkey_bytes.len(),
        });
    }
    if msg.period_seconds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "period_seconds must be non-zero".to_string(),
        });
    }
    if msg.max_num_words == 0 || msg.max_callback_gas_limit == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max_num_words and max_callback_gas_limit must be non-zero".to_string(),
        });
    }
    if msg.max_request_confirmations > execute::MAX_REQUEST_CONFIRMATIONS {
        return Err(ContractError::InvalidConfig {
            reason: format!(
                "max_request_confirmations must be at most {}",
                execute::MAX_REQUEST_CONFIRMATIONS
            ),
        });
    }

    let operators = msg
        .operators
        .iter()
        .map(|op| deps.api.addr_validate(op))
        .collect::<StdResult<Vec<_>>>()?;
    let consumers = msg
        .consumers
        .iter()
        .map(|c| deps.api.addr_validate(c))
        .collect::<StdResult<Vec<_>>>()?;

    let config = CoordinatorConfig {
        admin: info.sender.clone(),
        operators,
        consumers,
        quicknet_pubkey: pubkey_bytes,
        chain_hash: msg.chain_hash,
        genesis_time: msg.genesis_time,
        period_seconds: msg.period_seconds,
        max_num_words: msg.max_num_words,
        max_callback_gas_limit: msg.max_callback_gas_limit,
        max_request_confirmations: msg.max_request_confirmations,
    };

    CONFIG.save(deps.storage, &config)?;
    LATEST_ROUND.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "vrf-coordinator")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::RequestRandomWords {
            key_hash,
            min_confirmations,
            callback_gas_limit,
            num_words,
        } => execute::request_random_words(
            deps,
            env,
            info,
            RandomWordsParams {
                key_hash,
                min_confirmations,
                callback_gas_limit,
                num_words,
            },
        ),
        ExecuteMsg::SubmitBeacon {
            round,
            signature_hex,
        } => execute::submit_beacon(deps, env, info, round, signature_hex),
        ExecuteMsg::FulfillRandomWords { request_id, round } => {
            execute::fulfill_random_words(deps, env, info, request_id, round)
        }
        ExecuteMsg::UpdateOperators { add, remove } => {
            execute::update_operators(deps, env, info, add, remove)
        }
        ExecuteMsg::UpdateConsumers { add, remove } => {
            execute::update_consumers(deps, env, info, add, remove)
        }
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Beacon { round } => query::query_beacon(deps, round),
        QueryMsg::LatestRound {} => query::query_latest_round(deps),
        QueryMsg::Request { request_id } => query::query_request(deps, request_id),
        QueryMsg::ConsumerNonce { consumer } => query::query_consumer_nonce(deps, consumer),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        execute::CALLBACK_REPLY_ID => execute::handle_callback_reply(deps, msg),
        id => Err(StdError::generic_err(format!("unknown reply id {id}")).into()),
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
