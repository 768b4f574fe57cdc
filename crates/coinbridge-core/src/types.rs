//! Canonical in-memory model shared by every supported network.
//!
//! Backend JSON of any dialect is normalized into these types before it is
//! packed for storage or handed to the indexing engine. Script and raw
//! transaction fields stay hex-encoded strings, exactly as daemons report
//! them; the codec turns them into bytes.

use num_bigint::BigUint;
use serde::{Serialize, Serializer};

// ==============================================================================
// Transaction Types
// ==============================================================================

/// A transaction as reported by the backend, minus block metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tx {
    pub txid: String,
    pub version: i32,
    pub lock_time: u32,
    /// Transaction timestamp; 0 on networks that do not carry one.
    pub time: i64,
    /// Full serialized transaction, hex-encoded.
    pub hex: String,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptSig {
    pub hex: String,
}

/// A transaction input. Coinbase inputs carry `coinbase` and an empty `txid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vin {
    /// Coinbase script hex. An empty marker is read as `None`.
    pub coinbase: Option<String>,
    pub txid: String,
    pub vout: u32,
    pub script_sig: ScriptSig,
    pub sequence: u32,
    /// Addresses the backend already resolved (coinbase inputs on some forks).
    pub addresses: Vec<String>,
}

impl Vin {
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptPubKey {
    pub hex: String,
    pub addresses: Vec<String>,
}

/// A transaction output. `value_sat` is in the network's smallest unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vout {
    pub n: u32,
    pub script_pub_key: ScriptPubKey,
    #[serde(serialize_with = "serialize_big_uint")]
    pub value_sat: BigUint,
    /// Decimal amount text exactly as the backend sent it. Only populated
    /// between JSON parsing and value normalization.
    #[serde(skip)]
    pub json_value: Option<String>,
}

fn serialize_big_uint<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// ==============================================================================
// Chain Info
// ==============================================================================

/// Merged view of the backend's chain state, identical across dialects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChainInfo {
    /// `livenet` or `testnet`.
    pub chain: String,
    pub blocks: u32,
    pub best_block_hash: String,
    /// Always `"PoW: <x>, PoS: <y>"`.
    pub difficulty: String,
    pub time_offset: f64,
    pub version: String,
    pub protocol_version: String,
    pub subversion: String,
}

// ==============================================================================
// Blocks
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub hash: String,
    pub prev: String,
    pub next: String,
    pub height: u32,
    pub confirmations: i64,
    pub size: u32,
    pub time: i64,
}

/// A thin block: header plus transaction ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    #[serde(flatten)]
    pub header: BlockHeader,
    pub version: i64,
    pub merkle_root: String,
    pub nonce: u64,
    pub bits: String,
    pub txids: Vec<String>,
}

/// A block with fully materialized transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    pub header: BlockHeader,
    pub txs: Vec<Tx>,
}
