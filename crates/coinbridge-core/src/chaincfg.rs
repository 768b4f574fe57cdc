//! Chain parameters and the registry that hands them out.
//!
//! The registry is an explicit object shared through `Arc` instead of a
//! process-wide table. Registration is keyed by network magic and is
//! idempotent, so every construction path may register unconditionally.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::coins::Coin;

// ==============================================================================
// Chain Parameters
// ==============================================================================

/// Immutable per-network constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParameters {
    pub coin: Coin,
    /// `mainnet` or `testnet`.
    pub name: &'static str,
    /// Wire-protocol magic.
    pub net: u32,
    pub pubkey_hash_addr_id: u8,
    pub script_hash_addr_id: u8,
    pub bech32_hrp: Option<&'static str>,
}

impl ChainParameters {
    pub fn is_testnet(&self) -> bool {
        self.name == TESTNET
    }

    /// Human-readable label, e.g. `peercoin-mainnet`.
    pub fn display_name(&self) -> String {
        format!("{}-{}", self.coin, self.name)
    }
}

pub const MAINNET: &str = "mainnet";
pub const TESTNET: &str = "testnet";

pub const PEERCOIN_MAINNET: ChainParameters = ChainParameters {
    coin: Coin::Peercoin,
    name: MAINNET,
    net: 0xe6e8_e9e5,
    pubkey_hash_addr_id: 55,
    script_hash_addr_id: 117,
    bech32_hrp: Some("pc"),
};

pub const PEERCOIN_TESTNET: ChainParameters = ChainParameters {
    coin: Coin::Peercoin,
    name: TESTNET,
    net: 0xcbf2_c0ef,
    pubkey_hash_addr_id: 111,
    script_hash_addr_id: 196,
    bech32_hrp: Some("tpc"),
};

pub const CAPRICOIN_MAINNET: ChainParameters = ChainParameters {
    coin: Coin::Capricoin,
    name: MAINNET,
    net: 0xa3a2_a0a1,
    pubkey_hash_addr_id: 28,
    script_hash_addr_id: 35,
    bech32_hrp: None,
};

pub const SPARKLECOIN_MAINNET: ChainParameters = ChainParameters {
    coin: Coin::Sparklecoin,
    name: MAINNET,
    net: 0xe5e8_e9f2,
    pubkey_hash_addr_id: 63,
    script_hash_addr_id: 125,
    bech32_hrp: None,
};

// ==============================================================================
// Registry
// ==============================================================================

/// Thread-safe set of registered chain parameters, keyed by network magic.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    by_magic: RwLock<HashMap<u32, Arc<ChainParameters>>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `params`. Returns `false` (and changes nothing) when a set
    /// with the same magic is already present.
    pub fn register(&self, params: ChainParameters) -> bool {
        let mut by_magic = self.by_magic.write();
        if by_magic.contains_key(&params.net) {
            debug!(net = params.net, "chain parameters already registered");
            return false;
        }
        debug!(net = params.net, name = %params.display_name(), "registering chain parameters");
        by_magic.insert(params.net, Arc::new(params));
        true
    }

    pub fn is_registered(&self, net: u32) -> bool {
        self.by_magic.read().contains_key(&net)
    }

    pub fn get(&self, net: u32) -> Option<Arc<ChainParameters>> {
        self.by_magic.read().get(&net).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_magic.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_magic.read().is_empty()
    }

    /// Register every parameter set `coin` knows about.
    pub fn register_coin(&self, coin: Coin) {
        self.register(coin.mainnet_params());
        if let Some(test) = coin.testnet_params() {
            self.register(test);
        }
    }

    /// Resolve the parameters for `coin` on the chain named `network`.
    ///
    /// Test-chain names select the coin's test set when it has one. Every
    /// other name, including unrecognized ones, falls back to main.
    pub fn lookup(&self, coin: Coin, network: &str) -> Arc<ChainParameters> {
        self.register_coin(coin);

        let wanted = match network {
            "test" | "testnet" | "testnet3" => coin.testnet_params().unwrap_or_else(|| {
                debug!(%coin, network, "coin has no test chain; using main parameters");
                coin.mainnet_params()
            }),
            "main" | "mainnet" | "livenet" => coin.mainnet_params(),
            other => {
                warn!(%coin, network = other, "unknown network name; using main parameters");
                coin.mainnet_params()
            }
        };

        let net = wanted.net;
        self.get(net).unwrap_or_else(|| Arc::new(wanted))
    }
}
