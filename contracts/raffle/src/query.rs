use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{CheckUpkeepResponse, PlayersResponse, RoundHistoryResponse};
use crate::state::{CONFIG, PLAYERS, RAFFLE_STATE, ROUNDS};
use crate::upkeep::check_upkeep;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_raffle_state(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

/// Keeper poll: is a draw due at the current block time?
pub fn query_check_upkeep(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = RAFFLE_STATE.load(deps.storage)?;

    let response = match check_upkeep(&state, config.interval_seconds, env.block.time) {
        Ok(()) => CheckUpkeepResponse {
            upkeep_needed: true,
            blocker: None,
            reason: None,
        },
        Err(blocker) => CheckUpkeepResponse {
            upkeep_needed: false,
            reason: Some(blocker.to_string()),
            blocker: Some(blocker),
        },
    };
    to_json_binary(&response)
}

/// Player at `index` in the current round.
pub fn query_player(deps: Deps, index: u32) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    let player = PLAYERS.load(deps.storage, (state.round, index))?;
    to_json_binary(&player)
}

pub fn query_players(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let players: Vec<_> = PLAYERS
        .prefix(state.round)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, player)| player)
        .collect();

    to_json_binary(&PlayersResponse {
        round: state.round,
        players,
    })
}

pub fn query_number_of_players(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.num_players)
}

pub fn query_recent_winner(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.recent_winner)
}

pub fn query_round(deps: Deps, round: u64) -> StdResult<Binary> {
    let result = ROUNDS.may_load(deps.storage, round)?;
    to_json_binary(&result)
}

pub fn query_round_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let rounds: Vec<_> = ROUNDS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, result)| result)
        .collect();

    to_json_binary(&RoundHistoryResponse { rounds })
}
