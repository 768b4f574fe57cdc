mod cli;

use std::sync::Arc;

use bitcoin::hex::{DisplayHex, FromHex};
use clap::Parser;
use coinbridge_core::{ChainInfo, ChainRegistry, CoinRpc, HttpRpcClient, Tx};
use eyre::{eyre, WrapErr};

use cli::{BlockArgs, Cli, Command};

#[derive(serde::Serialize)]
struct InfoOutput<'a> {
    coin: String,
    network: &'a str,
    parameters: String,
    chain: ChainInfo,
}

#[derive(serde::Serialize)]
struct UnpackedOutput {
    height: u32,
    tx: Tx,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let transport = HttpRpcClient::new(
        &args.rpc_url,
        args.rpc_user.as_deref(),
        args.rpc_pass.as_deref(),
        args.rpc_cookie_file.as_deref(),
        args.rpc_requests_per_second,
    )
    .context("configure RPC client")?;
    let registry = Arc::new(ChainRegistry::new());
    let mut rpc = CoinRpc::new(Arc::new(transport), args.coin, registry)
        .with_tx_concurrency(args.rpc_concurrency);

    // Decoding needs no daemon.
    if let Command::UnpackTx { hex } = &args.command {
        let bytes = Vec::<u8>::from_hex(hex.trim()).context("decode packed record hex")?;
        let (tx, height) = rpc.unpack_tx(&bytes)?;
        return print_json(&UnpackedOutput { height, tx });
    }

    rpc.initialize().await.map_err(|err| {
        let message = format_rpc_connect_error(&args.rpc_url, &err.to_string());
        eyre!(message).wrap_err("while attempting to connect to the daemon RPC")
    })?;

    match args.command {
        Command::Info => {
            let chain = rpc.get_chain_info().await?;
            print_json(&InfoOutput {
                coin: rpc.coin().to_string(),
                network: rpc.network(),
                parameters: rpc.params().display_name(),
                chain,
            })
        }
        Command::Block(block_args) => run_block(&rpc, block_args).await,
        Command::Tx { txid } => {
            let tx = rpc.get_transaction(&txid).await?;
            print_json(&tx)
        }
        Command::PackTx {
            txid,
            height,
            block_time,
        } => {
            let tx = rpc.get_transaction(&txid).await?;
            let packed = rpc
                .pack_tx(&tx, height, block_time)
                .wrap_err_with(|| format!("pack transaction {txid}"))?;
            println!("{}", packed.as_slice().to_lower_hex_string());
            Ok(())
        }
        Command::UnpackTx { .. } => Ok(()),
    }
}

async fn run_block(rpc: &CoinRpc, args: BlockArgs) -> eyre::Result<()> {
    let height = args.height.unwrap_or_default();
    let hash = args.hash.unwrap_or_default();

    if args.txids_only {
        let hash = if hash.is_empty() {
            rpc.get_block_hash(height).await?
        } else {
            hash
        };
        let info = rpc.get_block_info(&hash).await?;
        return print_json(&info);
    }

    if hash.is_empty() && height == 0 {
        // An empty hash is only resolved for non-zero heights.
        let genesis = rpc.get_block_hash(0).await?;
        return print_json(&rpc.get_block(&genesis, 0).await?);
    }

    let block = rpc.get_block(&hash, height).await?;
    tracing::info!(
        hash = %block.header.hash,
        height = block.header.height,
        txs = block.txs.len(),
        "fetched block"
    );
    print_json(&block)
}

fn print_json<T: serde::Serialize>(value: &T) -> eyre::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not initialize against RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("401") || source_error.contains("403") {
        lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or --rpc-cookie-file"
                .into(),
        );
    } else if source_error.contains("Method not found") {
        lines.push("hint: the daemon does not speak this coin's RPC dialect; check --coin".into());
    } else if source_error.contains("error sending request for url") {
        lines.push("hint: request could not be sent; verify the URL and that the daemon is running with -server".into());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_hints_on_wrong_dialect() {
        let message = format_rpc_connect_error(
            "http://127.0.0.1:9902",
            "getinfo (): backend error -32601: Method not found",
        );
        assert!(message.contains("check --coin"));
    }

    #[test]
    fn connect_error_hints_on_auth() {
        let message = format_rpc_connect_error(
            "http://127.0.0.1:9902",
            "invalid JSON-RPC response: getinfo: HTTP 401 Unauthorized with empty body",
        );
        assert!(message.contains("authentication failed"));
    }
}
