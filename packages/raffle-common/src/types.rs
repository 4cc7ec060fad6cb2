use cosmwasm_schema::cw_serde;

/// Phase of the raffle state machine.
#[cw_serde]
pub enum RafflePhase {
    /// Accepting entries.
    Open,
    /// Entries closed, waiting for the randomness callback.
    Drawing,
}

impl RafflePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RafflePhase::Open => "open",
            RafflePhase::Drawing => "drawing",
        }
    }
}

/// Lifecycle status of a randomness request held by the coordinator.
#[cw_serde]
pub enum RequestStatus {
    Pending,
    Fulfilled,
}
