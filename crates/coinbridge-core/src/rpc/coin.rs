use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::chaincfg::{ChainParameters, ChainRegistry};
use crate::codec::TxCodec;
use crate::coins::{
    BlockRetrieval, ChainInfoDialect, Coin, CoinProfile, RPC_INVALID_ADDRESS_OR_KEY,
};
use crate::error::CoreError;
use crate::types::{Block, BlockInfo, ChainInfo, Tx};

use super::chain_info::{self, LIVENET, TESTNET};
use super::envelope::{parse_reply, BackendError, Reply};
use super::parsing;
use super::RpcTransport;

/// Concurrent `getrawtransaction` calls while assembling a thin block.
const DEFAULT_TX_CONCURRENCY: usize = 8;

/// Verbosity levels passed to `GetBlockParams::build`.
const VERBOSITY_TXIDS: u8 = 1;
const VERBOSITY_FULL: u8 = 2;

/// Chain-specific RPC adapter.
///
/// One generic algorithm drives every supported coin; the per-coin
/// differences (call sequence for chain info, `getblock` parameter shape,
/// not-found messages, duplicate-key sanitizing, thin-block skip policy)
/// come from the coin's [`CoinProfile`].
pub struct CoinRpc {
    transport: Arc<dyn RpcTransport>,
    profile: &'static CoinProfile,
    registry: Arc<ChainRegistry>,
    params: Arc<ChainParameters>,
    codec: TxCodec,
    network: &'static str,
    tx_concurrency: usize,
}

impl CoinRpc {
    /// Build an adapter on main-chain parameters. Call
    /// [`initialize`](Self::initialize) to switch to the backend's chain.
    pub fn new(transport: Arc<dyn RpcTransport>, coin: Coin, registry: Arc<ChainRegistry>) -> Self {
        let params = registry.lookup(coin, LIVENET);
        Self {
            transport,
            profile: coin.profile(),
            registry,
            codec: TxCodec::new(Arc::clone(&params)),
            params,
            network: LIVENET,
            tx_concurrency: DEFAULT_TX_CONCURRENCY,
        }
    }

    pub fn with_tx_concurrency(mut self, concurrency: usize) -> Self {
        self.tx_concurrency = concurrency.max(1);
        self
    }

    pub fn coin(&self) -> Coin {
        self.profile.coin
    }

    pub fn profile(&self) -> &'static CoinProfile {
        self.profile
    }

    pub fn params(&self) -> &ChainParameters {
        &self.params
    }

    pub fn codec(&self) -> &TxCodec {
        &self.codec
    }

    /// `livenet` or `testnet`.
    pub fn network(&self) -> &'static str {
        self.network
    }

    pub fn is_testnet(&self) -> bool {
        self.network == TESTNET
    }

    /// Detect the backend's chain and switch parameters and codec to it.
    pub async fn initialize(&mut self) -> Result<(), CoreError> {
        let info = self.get_chain_info().await?;
        let params = self.registry.lookup(self.profile.coin, &info.chain);

        self.network = if params.is_testnet() { TESTNET } else { LIVENET };
        self.codec = TxCodec::new(Arc::clone(&params));
        self.params = params;

        info!(
            coin = %self.profile.coin,
            backend_chain = %info.chain,
            network = self.network,
            blocks = info.blocks,
            "rpc: block chain {}",
            self.params.display_name()
        );
        Ok(())
    }

    // ==========================================================================
    // Chain
    // ==========================================================================

    pub async fn get_chain_info(&self) -> Result<ChainInfo, CoreError> {
        match self.profile.chain_info {
            ChainInfoDialect::Split => {
                let blockchain = self.call("getblockchaininfo", json!([]), String::new()).await?;
                let network = self.call("getnetworkinfo", json!([]), String::new()).await?;
                let difficulty = self.call("getdifficulty", json!([]), String::new()).await?;
                chain_info::from_split(&blockchain, &network, &difficulty, self.profile.difficulty)
            }
            ChainInfoDialect::LegacyGetInfo => {
                let getinfo = self.call("getinfo", json!([]), String::new()).await?;
                let best = self.call("getbestblockhash", json!([]), String::new()).await?;
                chain_info::from_legacy(&getinfo, &best, self.profile.difficulty)
            }
        }
    }

    pub async fn get_best_block_hash(&self) -> Result<String, CoreError> {
        let raw = self.call("getbestblockhash", json!([]), String::new()).await?;
        expect_string(raw, "getbestblockhash")
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    pub async fn get_block_hash(&self, height: u32) -> Result<String, CoreError> {
        let raw = self
            .block_call("getblockhash", json!([height]), format!("height {height}"), false)
            .await?;
        expect_string(raw, "getblockhash")
    }

    /// Block header and txids, without transaction detail.
    pub async fn get_block_info(&self, hash: &str) -> Result<BlockInfo, CoreError> {
        let params = self.profile.get_block_params.build(hash, VERBOSITY_TXIDS);
        let raw = self
            .block_call("getblock", params, format!("hash {hash}"), false)
            .await?;
        parsing::parse_block_info(&raw)
    }

    /// Block with every transaction materialized.
    ///
    /// An empty `hash` with a non-zero `height` is resolved through
    /// `getblockhash` first.
    pub async fn get_block(&self, hash: &str, height: u32) -> Result<Block, CoreError> {
        let hash = if hash.is_empty() && height > 0 {
            self.get_block_hash(height).await?
        } else {
            hash.to_owned()
        };

        match self.profile.block_retrieval {
            BlockRetrieval::Detailed => self.get_block_detailed(&hash).await,
            BlockRetrieval::Thin => self.get_block_thin(&hash).await,
        }
    }

    async fn get_block_detailed(&self, hash: &str) -> Result<Block, CoreError> {
        // Embedded transactions repeat keys just like `getrawtransaction`.
        let params = self.profile.get_block_params.build(hash, VERBOSITY_FULL);
        let raw = self
            .block_call(
                "getblock",
                params,
                format!("hash {hash}"),
                self.profile.dedup_transaction_json,
            )
            .await?;

        let header = parsing::parse_block_header(&raw)?;
        let mut txs = parsing::parse_block_txs(&raw)?;
        for tx in &mut txs {
            parsing::normalize_values(tx, self.profile.amount_decimals)?;
        }
        debug!(block = %header.hash, height = header.height, txs = txs.len(), "rpc: getblock");
        Ok(Block { header, txs })
    }

    async fn get_block_thin(&self, hash: &str) -> Result<Block, CoreError> {
        let info = self.get_block_info(hash).await?;

        let mut fetched = stream::iter(info.txids.iter())
            .map(|txid| async move { (txid, self.get_transaction(txid).await) })
            .buffered(self.tx_concurrency);

        let mut txs = Vec::with_capacity(info.txids.len());
        while let Some((txid, result)) = fetched.next().await {
            match result {
                Ok(tx) => txs.push(tx),
                Err(err) if self.is_skippable(&err) => {
                    warn!(block = %info.header.hash, %txid, error = %err, "rpc: getblock: skipping transaction");
                }
                Err(err) => return Err(err),
            }
        }
        drop(fetched);

        debug!(
            block = %info.header.hash,
            height = info.header.height,
            txids = info.txids.len(),
            txs = txs.len(),
            "rpc: getblock (thin)"
        );
        Ok(Block {
            header: info.header,
            txs,
        })
    }

    fn is_skippable(&self, err: &CoreError) -> bool {
        self.profile
            .skip_tx_error_code
            .is_some_and(|code| err.backend_code() == Some(code))
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    pub async fn get_transaction(&self, txid: &str) -> Result<Tx, CoreError> {
        let raw = self.get_transaction_specific(txid).await?;
        let mut tx = parsing::parse_tx(&raw)?;
        parsing::normalize_values(&mut tx, self.profile.amount_decimals)?;
        Ok(tx)
    }

    /// Mempool transactions are fetched exactly like confirmed ones.
    pub async fn get_transaction_for_mempool(&self, txid: &str) -> Result<Tx, CoreError> {
        self.get_transaction(txid).await
    }

    /// The verbose `getrawtransaction` object, after duplicate-key removal
    /// for daemons that need it.
    pub async fn get_transaction_specific(&self, txid: &str) -> Result<Value, CoreError> {
        let reply = self
            .request(
                "getrawtransaction",
                json!([txid, 1]),
                self.profile.dedup_transaction_json,
            )
            .await?;
        reply.map_err(|err| {
            if err.code == RPC_INVALID_ADDRESS_OR_KEY {
                CoreError::TxNotFound {
                    txid: txid.to_owned(),
                    message: err.message,
                }
            } else {
                err.into_core("getrawtransaction", format!("txid {txid}"))
            }
        })
    }

    pub fn pack_tx(&self, tx: &Tx, height: u32, block_time: u64) -> Result<Vec<u8>, CoreError> {
        self.codec.pack_tx(tx, height, block_time)
    }

    pub fn unpack_tx(&self, buf: &[u8]) -> Result<(Tx, u32), CoreError> {
        self.codec.unpack_tx(buf)
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    async fn request(&self, method: &'static str, params: Value, dedup: bool) -> Result<Reply, CoreError> {
        let body = self.transport.call(method, params).await?;
        parse_reply(&body, dedup)
    }

    async fn call(&self, method: &'static str, params: Value, context: String) -> Result<Value, CoreError> {
        self.request(method, params, false)
            .await?
            .map_err(|err| err.into_core(method, context))
    }

    /// Like [`call`](Self::call), but the coin's "no such block" messages
    /// become [`CoreError::BlockNotFound`].
    async fn block_call(
        &self,
        method: &'static str,
        params: Value,
        context: String,
        dedup: bool,
    ) -> Result<Value, CoreError> {
        self.request(method, params, dedup)
            .await?
            .map_err(|err| self.classify_block_error(err, method, context))
    }

    fn classify_block_error(&self, err: BackendError, method: &'static str, context: String) -> CoreError {
        if self.profile.is_block_not_found(&err.message) {
            debug!(method, %context, code = err.code, message = %err.message, "rpc: block not found");
            CoreError::BlockNotFound { context }
        } else {
            err.into_core(method, context)
        }
    }
}

fn expect_string(raw: Value, method: &str) -> Result<String, CoreError> {
    match raw {
        Value::String(s) => Ok(s),
        other => Err(CoreError::InvalidData(format!(
            "{method} result is not a string: {other}"
        ))),
    }
}
