//! Integration tests for the raffle and its VRF coordinator.
//!
//! Most tests run each contract against its own `cosmwasm_std::testing`
//! mocks. Messages one contract emits for the other are relayed by hand
//! through the target's `execute` entry point with the emitting contract as
//! sender, which is what the chain does for a `WasmMsg::Execute`.
//!
//! Flows that depend on submessage rollback run both contracts inside a
//! `cw_multi_test::App`.
//!
//! Run:
//! ```bash
//! cargo test -p raffle-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coins, from_json, Addr, BankMsg, CosmosMsg, Env, MemoryStorage, OwnedDeps, Response, Uint128,
    WasmMsg,
};
use cw_multi_test::{App, ContractWrapper, Executor};
use raffle::msg::{CheckUpkeepResponse, PlayersResponse};
use raffle::state::{RaffleState, RoundResult};
use raffle_common::types::{RafflePhase, RequestStatus};
use raffle_common::vrf::{compute_request_id, expand_random_words};
use raffle_vrf_coordinator::state::RandomnessRequest;

type MockDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

/// Real drand quicknet public key
const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";

/// Real quicknet test vector: round 1000
const TEST_ROUND: u64 = 1000;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";
const TEST_RANDOMNESS_HEX: &str =
    "fe290beca10872ef2fb164d2aa4442de4566183ec51c56ff3cd603d930e54fdd";

const KEY_HASH: &str = "474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c";
/// 0.01 INJ
const FEE: u128 = 10_000_000_000_000_000;
const INTERVAL: u64 = 30;
const CONFIRMATIONS: u64 = 3;

// ─── Instantiate messages ───

fn coordinator_instantiate_msg(
    operator: &Addr,
    consumers: Vec<String>,
) -> raffle_vrf_coordinator::msg::InstantiateMsg {
    raffle_vrf_coordinator::msg::InstantiateMsg {
        operators: vec![operator.to_string()],
        consumers,
        quicknet_pubkey_hex: QUICKNET_PK_HEX.to_string(),
        chain_hash: "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971".to_string(),
        genesis_time: 1692803367,
        period_seconds: 3,
        max_num_words: 10,
        max_callback_gas_limit: 2_500_000,
        max_request_confirmations: 200,
    }
}

fn raffle_instantiate_msg(coordinator: &Addr) -> raffle::msg::InstantiateMsg {
    raffle::msg::InstantiateMsg {
        entrance_fee: Uint128::new(FEE),
        denom: "inj".to_string(),
        interval_seconds: INTERVAL,
        vrf_coordinator: coordinator.to_string(),
        key_hash: KEY_HASH.to_string(),
        callback_gas_limit: 500_000,
        request_confirmations: Some(CONFIRMATIONS),
        num_words: Some(1),
    }
}

// ─── Harness ───

struct Suite {
    raffle: MockDeps,
    coordinator: MockDeps,
    raffle_addr: Addr,
    coordinator_addr: Addr,
    operator: Addr,
}

impl Suite {
    fn new() -> Self {
        let api = MockApi::default();
        let raffle_addr = api.addr_make("raffle");
        let coordinator_addr = api.addr_make("vrf_coordinator");
        let operator = api.addr_make("operator");
        let admin = api.addr_make("admin");

        let mut coordinator = mock_dependencies();
        let msg = coordinator_instantiate_msg(&operator, vec![raffle_addr.to_string()]);
        raffle_vrf_coordinator::contract::instantiate(
            coordinator.as_mut(),
            mock_env(),
            message_info(&admin, &[]),
            msg,
        )
        .unwrap();

        let mut raffle = mock_dependencies();
        let msg = raffle_instantiate_msg(&coordinator_addr);
        let mut env = mock_env();
        env.contract.address = raffle_addr.clone();
        raffle::contract::instantiate(raffle.as_mut(), env, message_info(&admin, &[]), msg)
            .unwrap();

        Suite {
            raffle,
            coordinator,
            raffle_addr,
            coordinator_addr,
            operator,
        }
    }

    /// Raffle env `seconds` after instantiation.
    fn raffle_env(&self, seconds: u64) -> Env {
        let mut env = mock_env();
        env.contract.address = self.raffle_addr.clone();
        env.block.time = env.block.time.plus_seconds(seconds);
        env
    }

    /// Coordinator env `blocks` after instantiation.
    fn coordinator_env(&self, blocks: u64) -> Env {
        let mut env = mock_env();
        env.contract.address = self.coordinator_addr.clone();
        env.block.height += blocks;
        env
    }

    fn enter(&mut self, name: &str, amount: u128) -> Addr {
        let player = self.raffle.api.addr_make(name);
        let env = self.raffle_env(1);
        raffle::contract::execute(
            self.raffle.as_mut(),
            env,
            message_info(&player, &coins(amount, "inj")),
            raffle::msg::ExecuteMsg::Enter {},
        )
        .unwrap();
        player
    }

    fn check_upkeep(&self, seconds: u64) -> CheckUpkeepResponse {
        let res = raffle::contract::query(
            self.raffle.as_ref(),
            self.raffle_env(seconds),
            raffle::msg::QueryMsg::CheckUpkeep {},
        )
        .unwrap();
        from_json(res).unwrap()
    }

    fn raffle_state(&self) -> RaffleState {
        let res = raffle::contract::query(
            self.raffle.as_ref(),
            self.raffle_env(0),
            raffle::msg::QueryMsg::RaffleState {},
        )
        .unwrap();
        from_json(res).unwrap()
    }

    fn coordinator_request(&self, request_id: &str) -> RandomnessRequest {
        let res = raffle_vrf_coordinator::contract::query(
            self.coordinator.as_ref(),
            mock_env(),
            raffle_vrf_coordinator::msg::QueryMsg::Request {
                request_id: request_id.to_string(),
            },
        )
        .unwrap();
        let request: Option<RandomnessRequest> = from_json(res).unwrap();
        request.unwrap()
    }

    /// Keeper triggers the draw; the outgoing request is relayed to the
    /// coordinator. Returns the id both sides agreed on.
    fn perform_upkeep(&mut self, seconds: u64) -> String {
        let keeper = self.raffle.api.addr_make("keeper");
        let env = self.raffle_env(seconds);
        let res = raffle::contract::execute(
            self.raffle.as_mut(),
            env.clone(),
            message_info(&keeper, &[]),
            raffle::msg::ExecuteMsg::PerformUpkeep {},
        )
        .unwrap();
        let raffle_side: String = from_json(res.data.unwrap()).unwrap();

        assert_eq!(res.messages.len(), 1);
        let (contract_addr, msg) = unwrap_wasm_execute(&res.messages[0].msg);
        assert_eq!(contract_addr, self.coordinator_addr.as_str());

        let request: raffle_vrf_coordinator::msg::ExecuteMsg = from_json(msg).unwrap();
        let mut coordinator_env = self.coordinator_env(0);
        coordinator_env.block.time = env.block.time;
        let res = raffle_vrf_coordinator::contract::execute(
            self.coordinator.as_mut(),
            coordinator_env,
            message_info(&self.raffle_addr, &[]),
            request,
        )
        .unwrap();
        let coordinator_side: String = from_json(res.data.unwrap()).unwrap();

        assert_eq!(raffle_side, coordinator_side);
        raffle_side
    }

    fn submit_beacon(&mut self) {
        let env = self.coordinator_env(1);
        raffle_vrf_coordinator::contract::execute(
            self.coordinator.as_mut(),
            env,
            message_info(&self.operator, &[]),
            raffle_vrf_coordinator::msg::ExecuteMsg::SubmitBeacon {
                round: TEST_ROUND,
                signature_hex: TEST_SIG_HEX.to_string(),
            },
        )
        .unwrap();
    }

    /// Operator fulfils on the coordinator. Returns the coordinator response
    /// holding the callback submessage.
    fn fulfill(&mut self, request_id: &str, blocks: u64) -> Response {
        let env = self.coordinator_env(blocks);
        raffle_vrf_coordinator::contract::execute(
            self.coordinator.as_mut(),
            env,
            message_info(&self.operator, &[]),
            raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
                request_id: request_id.to_string(),
                round: TEST_ROUND,
            },
        )
        .unwrap()
    }

    /// Deliver the coordinator's callback to the raffle.
    fn relay_callback(&mut self, coordinator_res: &Response, seconds: u64) -> Response {
        assert_eq!(coordinator_res.messages.len(), 1);
        let (contract_addr, msg) = unwrap_wasm_execute(&coordinator_res.messages[0].msg);
        assert_eq!(contract_addr, self.raffle_addr.as_str());

        let callback: raffle::msg::ExecuteMsg = from_json(msg).unwrap();
        let env = self.raffle_env(seconds);
        raffle::contract::execute(
            self.raffle.as_mut(),
            env,
            message_info(&self.coordinator_addr, &[]),
            callback,
        )
        .unwrap()
    }
}

// ─── Multi-contract app ───

/// Both contracts deployed in one `App`, so submessages, replies and bank
/// transfers execute and roll back the way they do on chain.
struct ChainSuite {
    app: App,
    raffle: Addr,
    coordinator: Addr,
    operator: Addr,
}

impl ChainSuite {
    /// Each named player starts with one entrance fee.
    fn new(players: &[&str]) -> Self {
        let api = MockApi::default();
        let funded: Vec<Addr> = players.iter().map(|name| api.addr_make(name)).collect();
        let mut app = App::new(|router, _api, storage| {
            for player in &funded {
                router
                    .bank
                    .init_balance(storage, player, coins(FEE, "inj"))
                    .unwrap();
            }
        });
        let admin = api.addr_make("admin");
        let operator = api.addr_make("operator");

        let coordinator_code = app.store_code(Box::new(
            ContractWrapper::new(
                raffle_vrf_coordinator::contract::execute,
                raffle_vrf_coordinator::contract::instantiate,
                raffle_vrf_coordinator::contract::query,
            )
            .with_reply(raffle_vrf_coordinator::contract::reply),
        ));
        let raffle_code = app.store_code(Box::new(
            ContractWrapper::new(
                raffle::contract::execute,
                raffle::contract::instantiate,
                raffle::contract::query,
            )
            .with_reply(raffle::contract::reply),
        ));

        let coordinator = app
            .instantiate_contract(
                coordinator_code,
                admin.clone(),
                &coordinator_instantiate_msg(&operator, vec![]),
                &[],
                "vrf-coordinator",
                None,
            )
            .unwrap();
        let raffle = app
            .instantiate_contract(
                raffle_code,
                admin.clone(),
                &raffle_instantiate_msg(&coordinator),
                &[],
                "raffle",
                None,
            )
            .unwrap();

        // The raffle address is only known once it is deployed
        app.execute_contract(
            admin,
            coordinator.clone(),
            &raffle_vrf_coordinator::msg::ExecuteMsg::UpdateConsumers {
                add: vec![raffle.to_string()],
                remove: vec![],
            },
            &[],
        )
        .unwrap();

        ChainSuite {
            app,
            raffle,
            coordinator,
            operator,
        }
    }

    fn enter(&mut self, player: &Addr) {
        self.app
            .execute_contract(
                player.clone(),
                self.raffle.clone(),
                &raffle::msg::ExecuteMsg::Enter {},
                &coins(FEE, "inj"),
            )
            .unwrap();
    }

    fn raffle_state(&self) -> RaffleState {
        self.app
            .wrap()
            .query_wasm_smart(self.raffle.to_string(), &raffle::msg::QueryMsg::RaffleState {})
            .unwrap()
    }

    fn request_status(&self, request_id: &str) -> RequestStatus {
        let request: Option<RandomnessRequest> = self
            .app
            .wrap()
            .query_wasm_smart(
                self.coordinator.to_string(),
                &raffle_vrf_coordinator::msg::QueryMsg::Request {
                    request_id: request_id.to_string(),
                },
            )
            .unwrap();
        request.unwrap().status
    }

    fn balance(&self, addr: &Addr) -> Uint128 {
        self.app
            .wrap()
            .query_balance(addr.to_string(), "inj")
            .unwrap()
            .amount
    }

    fn fulfill(&mut self, request_id: &str) {
        self.app
            .execute_contract(
                self.operator.clone(),
                self.coordinator.clone(),
                &raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
                    request_id: request_id.to_string(),
                    round: TEST_ROUND,
                },
                &[],
            )
            .unwrap();
    }
}

fn unwrap_wasm_execute(msg: &CosmosMsg) -> (&str, &cosmwasm_std::Binary) {
    match msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => (contract_addr.as_str(), msg),
        other => panic!("expected wasm execute, got {:?}", other),
    }
}

fn expected_winner_index(request_id: &str, num_players: u32) -> u32 {
    let randomness = hex::decode(TEST_RANDOMNESS_HEX).unwrap();
    let word = expand_random_words(&randomness, request_id, 1)[0];
    raffle::upkeep::winner_index(word, num_players)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_raffle_cycle() {
    let mut suite = Suite::new();

    let players = vec![
        suite.enter("alice", FEE),
        suite.enter("bob", FEE),
        suite.enter("carol", FEE),
    ];

    // Interval not yet elapsed
    let upkeep = suite.check_upkeep(INTERVAL - 1);
    assert!(!upkeep.upkeep_needed);
    assert!(upkeep.reason.is_some());

    let upkeep = suite.check_upkeep(INTERVAL + 1);
    assert!(upkeep.upkeep_needed);
    assert_eq!(upkeep.reason, None);

    let request_id = suite.perform_upkeep(INTERVAL + 1);
    assert_eq!(
        request_id,
        compute_request_id(KEY_HASH, suite.raffle_addr.as_str(), 0)
    );

    let state = suite.raffle_state();
    assert_eq!(state.phase, RafflePhase::Drawing);
    assert_eq!(
        state.pending_request.as_ref().map(|p| p.id.as_str()),
        Some(request_id.as_str())
    );

    let request = suite.coordinator_request(&request_id);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.consumer, suite.raffle_addr);
    assert_eq!(request.min_confirmations, CONFIRMATIONS);

    suite.submit_beacon();
    let coordinator_res = suite.fulfill(&request_id, CONFIRMATIONS);
    assert_eq!(coordinator_res.messages[0].gas_limit, Some(500_000));

    let res = suite.relay_callback(&coordinator_res, INTERVAL + 5);

    let winner = players[expected_winner_index(&request_id, 3) as usize].clone();
    assert_eq!(res.messages.len(), 1);
    assert_eq!(
        res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: winner.to_string(),
            amount: coins(3 * FEE, "inj"),
        })
    );
    assert!(res.events.iter().any(|e| e.ty == "raffle_winner_picked"));

    // Raffle reset and reopened
    let state = suite.raffle_state();
    assert_eq!(state.phase, RafflePhase::Open);
    assert_eq!(state.round, 1);
    assert_eq!(state.num_players, 0);
    assert_eq!(state.pool_balance, Uint128::zero());
    assert!(state.pending_request.is_none());
    assert_eq!(state.recent_winner, Some(winner.clone()));
    assert_eq!(state.last_draw_time, suite.raffle_env(INTERVAL + 5).block.time);

    let res = raffle::contract::query(
        suite.raffle.as_ref(),
        suite.raffle_env(0),
        raffle::msg::QueryMsg::Players {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let current: PlayersResponse = from_json(res).unwrap();
    assert!(current.players.is_empty());

    let res = raffle::contract::query(
        suite.raffle.as_ref(),
        suite.raffle_env(0),
        raffle::msg::QueryMsg::Round { round: 0 },
    )
    .unwrap();
    let result: Option<RoundResult> = from_json(res).unwrap();
    let result = result.unwrap();
    assert_eq!(result.winner, winner);
    assert_eq!(result.amount, Uint128::new(3 * FEE));
    assert_eq!(result.request_id, request_id);

    let request = suite.coordinator_request(&request_id);
    assert_eq!(request.status, RequestStatus::Fulfilled);
    assert_eq!(request.drand_round, Some(TEST_ROUND));

    // Delivering the same callback again is rejected
    let (_, msg) = unwrap_wasm_execute(&coordinator_res.messages[0].msg);
    let callback: raffle::msg::ExecuteMsg = from_json(msg).unwrap();
    let env = suite.raffle_env(INTERVAL + 6);
    let err = raffle::contract::execute(
        suite.raffle.as_mut(),
        env,
        message_info(&suite.coordinator_addr, &[]),
        callback,
    )
    .unwrap_err();
    assert!(matches!(err, raffle::ContractError::UnknownRequest { .. }));
}

#[test]
fn test_failed_payout_rolls_back_and_retries() {
    let mut chain = ChainSuite::new(&["alice", "bob"]);
    let api = MockApi::default();
    let alice = api.addr_make("alice");
    let bob = api.addr_make("bob");

    chain.enter(&alice);
    chain.enter(&bob);
    assert_eq!(chain.balance(&chain.raffle), Uint128::new(2 * FEE));

    chain
        .app
        .update_block(|block| block.time = block.time.plus_seconds(INTERVAL + 1));
    chain
        .app
        .execute_contract(
            api.addr_make("keeper"),
            chain.raffle.clone(),
            &raffle::msg::ExecuteMsg::PerformUpkeep {},
            &[],
        )
        .unwrap();
    let request_id = chain.raffle_state().pending_request.unwrap().id;
    assert_eq!(chain.request_status(&request_id), RequestStatus::Pending);

    chain
        .app
        .execute_contract(
            chain.operator.clone(),
            chain.coordinator.clone(),
            &raffle_vrf_coordinator::msg::ExecuteMsg::SubmitBeacon {
                round: TEST_ROUND,
                signature_hex: TEST_SIG_HEX.to_string(),
            },
            &[],
        )
        .unwrap();
    chain
        .app
        .update_block(|block| block.height += CONFIRMATIONS);

    // Raffle can no longer cover its pool, so the payout bounces
    let sink = api.addr_make("sink");
    chain
        .app
        .send_tokens(chain.raffle.clone(), sink.clone(), &coins(2 * FEE, "inj"))
        .unwrap();
    chain.fulfill(&request_id);

    let state = chain.raffle_state();
    assert_eq!(state.phase, RafflePhase::Drawing);
    assert_eq!(state.round, 0);
    assert_eq!(state.num_players, 2);
    assert_eq!(state.pool_balance, Uint128::new(2 * FEE));
    assert_eq!(
        state.pending_request.map(|pending| pending.id),
        Some(request_id.clone())
    );
    assert_eq!(state.recent_winner, None);
    let round: Option<RoundResult> = chain
        .app
        .wrap()
        .query_wasm_smart(
            chain.raffle.to_string(),
            &raffle::msg::QueryMsg::Round { round: 0 },
        )
        .unwrap();
    assert!(round.is_none());
    assert_eq!(chain.request_status(&request_id), RequestStatus::Pending);

    // Funds are back; the operator fulfils the same request again
    chain
        .app
        .send_tokens(sink, chain.raffle.clone(), &coins(2 * FEE, "inj"))
        .unwrap();
    chain.app.update_block(|block| block.height += 1);
    chain.fulfill(&request_id);

    let winner = [&alice, &bob][expected_winner_index(&request_id, 2) as usize].clone();
    let state = chain.raffle_state();
    assert_eq!(state.phase, RafflePhase::Open);
    assert_eq!(state.round, 1);
    assert_eq!(state.num_players, 0);
    assert_eq!(state.pool_balance, Uint128::zero());
    assert!(state.pending_request.is_none());
    assert_eq!(state.recent_winner, Some(winner.clone()));

    assert_eq!(chain.balance(&winner), Uint128::new(2 * FEE));
    assert_eq!(chain.balance(&chain.raffle), Uint128::zero());
    assert_eq!(chain.request_status(&request_id), RequestStatus::Fulfilled);
}

#[test]
fn test_consecutive_rounds_share_nonce() {
    let mut suite = Suite::new();

    suite.enter("alice", FEE);
    let first = suite.perform_upkeep(INTERVAL + 1);
    suite.submit_beacon();
    let res = suite.fulfill(&first, CONFIRMATIONS);
    suite.relay_callback(&res, INTERVAL + 2);

    // Only one player, so they win
    let state = suite.raffle_state();
    assert_eq!(state.recent_winner, Some(suite.raffle.api.addr_make("alice")));

    suite.enter("bob", FEE);

    // The interval restarts from the last draw
    let upkeep = suite.check_upkeep(INTERVAL + 3);
    assert!(!upkeep.upkeep_needed);

    let second = suite.perform_upkeep(2 * INTERVAL + 3);
    assert_ne!(first, second);
    assert_eq!(
        second,
        compute_request_id(KEY_HASH, suite.raffle_addr.as_str(), 1)
    );

    let res = raffle_vrf_coordinator::contract::query(
        suite.coordinator.as_ref(),
        mock_env(),
        raffle_vrf_coordinator::msg::QueryMsg::ConsumerNonce {
            consumer: suite.raffle_addr.to_string(),
        },
    )
    .unwrap();
    let nonce: u64 = from_json(res).unwrap();
    assert_eq!(nonce, suite.raffle_state().request_nonce);
}

#[test]
fn test_fulfill_waits_for_confirmations() {
    let mut suite = Suite::new();
    suite.enter("alice", FEE);
    let request_id = suite.perform_upkeep(INTERVAL + 1);
    suite.submit_beacon();

    let env = suite.coordinator_env(CONFIRMATIONS - 1);
    let operator = suite.operator.clone();
    let err = raffle_vrf_coordinator::contract::execute(
        suite.coordinator.as_mut(),
        env,
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
            request_id: request_id.clone(),
            round: TEST_ROUND,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        raffle_vrf_coordinator::ContractError::InsufficientConfirmations { .. }
    ));

    // Raffle still drawing, entries closed
    let player = suite.raffle.api.addr_make("late");
    let env = suite.raffle_env(INTERVAL + 2);
    let err = raffle::contract::execute(
        suite.raffle.as_mut(),
        env,
        message_info(&player, &coins(FEE, "inj")),
        raffle::msg::ExecuteMsg::Enter {},
    )
    .unwrap_err();
    assert!(matches!(err, raffle::ContractError::LotteryNotOpen));
}
