use cosmwasm_std::{to_json_binary, Binary, Deps, StdResult};

use crate::state::{BEACONS, CONFIG, LATEST_ROUND, NONCES, REQUESTS};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_beacon(deps: Deps, round: u64) -> StdResult<Binary> {
    let beacon = BEACONS.may_load(deps.storage, round)?;
    to_json_binary(&beacon)
}

pub fn query_latest_round(deps: Deps) -> StdResult<Binary> {
    let round = LATEST_ROUND.may_load(deps.storage)?.unwrap_or(0);
    to_json_binary(&round)
}

pub fn query_request(deps: Deps, request_id: String) -> StdResult<Binary> {
    let request = REQUESTS.may_load(deps.storage, &request_id)?;
    to_json_binary(&request)
}

pub fn query_consumer_nonce(deps: Deps, consumer: String) -> StdResult<Binary> {
    let consumer = deps.api.addr_validate(&consumer)?;
    let nonce = NONCES.may_load(deps.storage, &consumer)?.unwrap_or(0);
    to_json_binary(&nonce)
}
