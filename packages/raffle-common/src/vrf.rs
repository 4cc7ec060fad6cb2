use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};

/// Domain separation prefixes so request ids and random words can never collide.
const REQUEST_ID_PREFIX: u8 = 0x02;
const RANDOM_WORD_PREFIX: u8 = 0x03;

/// Message a consumer sends to the coordinator to request randomness.
///
/// Must stay wire-compatible with the coordinator's own `ExecuteMsg`.
#[cw_serde]
pub enum VrfCoordinatorExecuteMsg {
    RequestRandomWords {
        /// Hex-encoded 32-byte key hash selecting the coordinator lane.
        key_hash: String,
        /// Blocks that must pass before the request may be fulfilled.
        min_confirmations: u64,
        /// Gas forwarded to the consumer callback.
        callback_gas_limit: u64,
        num_words: u32,
    },
}

/// Callback the coordinator delivers to a consumer once per fulfilment.
///
/// Must stay wire-compatible with the consumer's own `ExecuteMsg`.
#[cw_serde]
pub enum VrfConsumerExecuteMsg {
    RawFulfillRandomWords {
        request_id: String,
        random_words: Vec<Uint256>,
    },
}

/// Derive the identifier of a consumer's `nonce`-th randomness request.
///
/// `request_id = hex(sha256( 0x02 || key_hash || consumer || nonce_u64_be ))`
///
/// The coordinator issues ids with this function from its per-consumer nonce,
/// and a consumer tracking its own request count can derive the same id
/// without waiting for a reply.
pub fn compute_request_id(key_hash: &str, consumer: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update([REQUEST_ID_PREFIX]);
    hasher.update(key_hash.as_bytes());
    hasher.update(consumer.as_bytes());
    hasher.update(nonce.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Expand a 32-byte beacon into `num_words` independent 256-bit words bound to
/// one request.
///
/// `word_i = sha256( 0x03 || randomness || request_id || i_u32_be )`
pub fn expand_random_words(randomness: &[u8], request_id: &str, num_words: u32) -> Vec<Uint256> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update([RANDOM_WORD_PREFIX]);
            hasher.update(randomness);
            hasher.update(request_id.as_bytes());
            hasher.update(i.to_be_bytes());
            Uint256::from_be_bytes(hasher.finalize().into())
        })
        .collect()
}
