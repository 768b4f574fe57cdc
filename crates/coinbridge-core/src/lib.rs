pub mod chaincfg;
pub mod codec;
pub mod coins;
pub mod error;
pub mod json;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod types;

pub use chaincfg::{ChainParameters, ChainRegistry};
pub use codec::TxCodec;
pub use coins::Coin;
pub use error::CoreError;
pub use rpc::{CoinRpc, HttpRpcClient, RpcTransport};
pub use types::{Block, BlockInfo, ChainInfo, Tx};
