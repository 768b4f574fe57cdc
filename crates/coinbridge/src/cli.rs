use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coinbridge_core::Coin;

/// coinbridge: query Peercoin-family daemons and pack/unpack transaction records.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Daemon RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:9902", env = "COINBRIDGE_RPC_URL")]
    pub rpc_url: String,

    /// RPC username.
    #[arg(long, env = "COINBRIDGE_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password.
    #[arg(long, env = "COINBRIDGE_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Cookie file with `username:password`, used when no user/pass is given.
    #[arg(long, env = "COINBRIDGE_RPC_COOKIE_FILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Outbound RPC request limit per second.
    #[arg(long)]
    pub rpc_requests_per_second: Option<u32>,

    /// Maximum concurrent transaction fetches for thin blocks.
    #[arg(long, default_value = "8")]
    pub rpc_concurrency: usize,

    /// Coin the daemon serves (peercoin, capricoin, sparklecoin).
    #[arg(long, default_value = "peercoin", env = "COINBRIDGE_COIN")]
    pub coin: Coin,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Detect the chain and print chain info.
    Info,
    /// Fetch a block by hash or height.
    Block(BlockArgs),
    /// Fetch a transaction.
    Tx {
        txid: String,
    },
    /// Fetch a transaction and print its packed record as hex.
    PackTx {
        txid: String,
        #[arg(long)]
        height: u32,
        /// Block time in unix seconds.
        #[arg(long)]
        block_time: u64,
    },
    /// Decode a packed record given as hex.
    UnpackTx {
        hex: String,
    },
}

#[derive(Args)]
pub struct BlockArgs {
    #[arg(long, required_unless_present = "height", conflicts_with = "height")]
    pub hash: Option<String>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Print header and txids only.
    #[arg(long)]
    pub txids_only: bool,
}
