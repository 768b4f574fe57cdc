//! Per-network capability table.
//!
//! Every supported daemon speaks a slightly different RPC dialect. Rather
//! than one adapter type per coin, each coin is described by a static
//! [`CoinProfile`] and a single generic adapter (`rpc::CoinRpc`) is
//! parameterized by it.

use std::fmt;
use std::str::FromStr;

use crate::chaincfg::{
    ChainParameters, CAPRICOIN_MAINNET, PEERCOIN_MAINNET, PEERCOIN_TESTNET, SPARKLECOIN_MAINNET,
};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coin {
    Peercoin,
    Capricoin,
    Sparklecoin,
}

impl Coin {
    pub const ALL: [Coin; 3] = [Coin::Peercoin, Coin::Capricoin, Coin::Sparklecoin];

    pub fn mainnet_params(self) -> ChainParameters {
        match self {
            Self::Peercoin => PEERCOIN_MAINNET,
            Self::Capricoin => CAPRICOIN_MAINNET,
            Self::Sparklecoin => SPARKLECOIN_MAINNET,
        }
    }

    pub fn testnet_params(self) -> Option<ChainParameters> {
        match self {
            Self::Peercoin => Some(PEERCOIN_TESTNET),
            Self::Capricoin | Self::Sparklecoin => None,
        }
    }

    pub fn profile(self) -> &'static CoinProfile {
        match self {
            Self::Peercoin => &PEERCOIN,
            Self::Capricoin => &CAPRICOIN,
            Self::Sparklecoin => &SPARKLECOIN,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peercoin => write!(f, "peercoin"),
            Self::Capricoin => write!(f, "capricoin"),
            Self::Sparklecoin => write!(f, "sparklecoin"),
        }
    }
}

impl FromStr for Coin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "peercoin" | "ppc" => Ok(Self::Peercoin),
            "capricoin" | "cps" => Ok(Self::Capricoin),
            "sparklecoin" | "sprk" => Ok(Self::Sparklecoin),
            other => Err(CoreError::Config(format!("unsupported coin `{other}`"))),
        }
    }
}

// ==============================================================================
// Dialect Selectors
// ==============================================================================

/// How chain state is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainInfoDialect {
    /// `getinfo` for blocks/difficulty/testnet plus `getbestblockhash`.
    LegacyGetInfo,
    /// `getblockchaininfo` + `getnetworkinfo` + `getdifficulty`.
    Split,
}

/// How the single difficulty string is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyStrategy {
    /// The backend reports an object with `proof-of-work` and `proof-of-stake`.
    Dual,
    /// The backend reports one number; the PoS component is a fixed literal.
    PowWithFixedPos(&'static str),
}

/// Shape of the positional `getblock` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetBlockParams {
    /// `[h, n]` with an integer verbosity.
    Verbosity,
    /// `[h, txinfo]`, true only for full transactions.
    TxInfo,
    /// `[h, verbose]`
    Verbose,
}

impl GetBlockParams {
    /// Build request params; `verbosity` follows Bitcoin Core levels
    /// (1 = txids, 2 = full transactions).
    pub fn build(self, hash: &str, verbosity: u8) -> serde_json::Value {
        match self {
            Self::Verbosity => serde_json::json!([hash, verbosity]),
            Self::TxInfo => serde_json::json!([hash, verbosity > 1]),
            Self::Verbose => serde_json::json!([hash, verbosity > 0]),
        }
    }
}

/// How a block with full transactions is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRetrieval {
    /// One detailed `getblock` call returns every transaction.
    Detailed,
    /// `getblock` returns txids only; each transaction is fetched separately.
    Thin,
}

// ==============================================================================
// Coin Profile
// ==============================================================================

#[derive(Debug)]
pub struct CoinProfile {
    pub coin: Coin,
    pub chain_info: ChainInfoDialect,
    pub difficulty: DifficultyStrategy,
    pub get_block_params: GetBlockParams,
    pub block_retrieval: BlockRetrieval,
    /// Exact backend messages meaning "no such block".
    pub block_not_found_messages: &'static [&'static str],
    /// Backend emits duplicate keys in `getrawtransaction` output.
    pub dedup_transaction_json: bool,
    /// Backend code that, during thin block retrieval, marks a transaction
    /// to skip rather than fail the block.
    pub skip_tx_error_code: Option<i64>,
    pub amount_decimals: u32,
}

/// `RPC_INVALID_ADDRESS_OR_KEY`: "No information available about transaction".
pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

pub static PEERCOIN: CoinProfile = CoinProfile {
    coin: Coin::Peercoin,
    chain_info: ChainInfoDialect::Split,
    difficulty: DifficultyStrategy::Dual,
    get_block_params: GetBlockParams::Verbosity,
    block_retrieval: BlockRetrieval::Detailed,
    block_not_found_messages: &["Block not found", "Block height out of range"],
    dedup_transaction_json: false,
    skip_tx_error_code: None,
    amount_decimals: 6,
};

pub static CAPRICOIN: CoinProfile = CoinProfile {
    coin: Coin::Capricoin,
    chain_info: ChainInfoDialect::LegacyGetInfo,
    difficulty: DifficultyStrategy::Dual,
    get_block_params: GetBlockParams::TxInfo,
    block_retrieval: BlockRetrieval::Detailed,
    block_not_found_messages: &["Block not found", "Block number out of range."],
    dedup_transaction_json: true,
    skip_tx_error_code: None,
    amount_decimals: 8,
};

pub static SPARKLECOIN: CoinProfile = CoinProfile {
    coin: Coin::Sparklecoin,
    chain_info: ChainInfoDialect::LegacyGetInfo,
    difficulty: DifficultyStrategy::PowWithFixedPos("1.0"),
    get_block_params: GetBlockParams::Verbose,
    block_retrieval: BlockRetrieval::Thin,
    block_not_found_messages: &["Block not found", "Block height out of range"],
    dedup_transaction_json: true,
    skip_tx_error_code: Some(RPC_INVALID_ADDRESS_OR_KEY),
    amount_decimals: 8,
};

impl CoinProfile {
    pub fn is_block_not_found(&self, message: &str) -> bool {
        self.block_not_found_messages.contains(&message)
    }
}
