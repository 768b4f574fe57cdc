use serde_json::Value;

use crate::coins::DifficultyStrategy;
use crate::error::CoreError;
use crate::types::ChainInfo;

use super::parsing::{parse_integer_or_default, parse_integer_required, scalar_text};

pub(super) const LIVENET: &str = "livenet";
pub(super) const TESTNET: &str = "testnet";

/// `getinfo` + `getbestblockhash` daemons.
pub(super) fn from_legacy(
    getinfo: &Value,
    best_block_hash: &Value,
    difficulty: DifficultyStrategy,
) -> Result<ChainInfo, CoreError> {
    let testnet = getinfo
        .get("testnet")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(ChainInfo {
        chain: network_label(testnet).to_owned(),
        blocks: parse_integer_required::<u32, false>(getinfo.get("blocks"), "blocks")?,
        best_block_hash: best_block_hash
            .as_str()
            .ok_or_else(|| CoreError::InvalidData("getbestblockhash result is not a string".into()))?
            .to_owned(),
        difficulty: format_difficulty(difficulty, getinfo.get("difficulty"))?,
        time_offset: getinfo
            .get("timeoffset")
            .and_then(Value::as_f64)
            .unwrap_or_default(),
        version: version_text(getinfo.get("version"))?,
        protocol_version: version_text(getinfo.get("protocolversion"))?,
        subversion: String::new(),
    })
}

/// `getblockchaininfo` + `getnetworkinfo` + `getdifficulty` daemons.
pub(super) fn from_split(
    blockchain: &Value,
    network: &Value,
    difficulty_raw: &Value,
    difficulty: DifficultyStrategy,
) -> Result<ChainInfo, CoreError> {
    // Newer daemons report `chain: "test"`, older forks a `testnet` flag.
    let testnet = match blockchain.get("testnet").and_then(Value::as_bool) {
        Some(flag) => flag,
        None => matches!(
            blockchain.get("chain").and_then(Value::as_str),
            Some("test" | "testnet")
        ),
    };

    Ok(ChainInfo {
        chain: network_label(testnet).to_owned(),
        blocks: parse_integer_required::<u32, false>(blockchain.get("blocks"), "blocks")?,
        best_block_hash: blockchain
            .get("bestblockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidData("missing bestblockhash".into()))?
            .to_owned(),
        difficulty: format_difficulty(difficulty, Some(difficulty_raw))?,
        time_offset: network
            .get("timeoffset")
            .and_then(Value::as_f64)
            .unwrap_or_default(),
        version: version_text(network.get("version"))?,
        protocol_version: version_text(network.get("protocolversion"))?,
        subversion: network
            .get("subversion")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
    })
}

fn network_label(testnet: bool) -> &'static str {
    if testnet {
        TESTNET
    } else {
        LIVENET
    }
}

fn version_text(value: Option<&Value>) -> Result<String, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Ok(parse_integer_or_default::<i64, true>(value, "version")?.to_string()),
    }
}

/// Render difficulty as `PoW: <pow>, PoS: <pos>`.
pub(super) fn format_difficulty(
    strategy: DifficultyStrategy,
    raw: Option<&Value>,
) -> Result<String, CoreError> {
    match strategy {
        DifficultyStrategy::Dual => {
            let raw = raw.ok_or_else(|| CoreError::InvalidData("missing difficulty".into()))?;
            let pow = difficulty_component(raw.get("proof-of-work"), "proof-of-work")?;
            let pos = difficulty_component(raw.get("proof-of-stake"), "proof-of-stake")?;
            Ok(format!("PoW: {pow}, PoS: {pos}"))
        }
        DifficultyStrategy::PowWithFixedPos(pos) => {
            let pow = difficulty_component(raw, "difficulty")?;
            Ok(format!("PoW: {pow}, PoS: {pos}"))
        }
    }
}

/// Difficulty text is passed through as the daemon wrote it.
fn difficulty_component(value: Option<&Value>, field: &str) -> Result<String, CoreError> {
    scalar_text(value, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dual_difficulty_formats_both_components() {
        let raw = json!({"proof-of-work": 12.5, "proof-of-stake": 3000000.25});
        assert_eq!(
            format_difficulty(DifficultyStrategy::Dual, Some(&raw)).expect("valid"),
            "PoW: 12.5, PoS: 3000000.25"
        );
    }

    #[test]
    fn fixed_pos_difficulty_uses_literal() {
        assert_eq!(
            format_difficulty(DifficultyStrategy::PowWithFixedPos("1.0"), Some(&json!(0.0625)))
                .expect("valid"),
            "PoW: 0.0625, PoS: 1.0"
        );
    }

    #[test]
    fn difficulty_text_is_not_reformatted() {
        let raw: Value =
            serde_json::from_str(r#"{"proof-of-work":3.00000025e+06,"proof-of-stake":0.10000000000000000555}"#)
                .expect("valid JSON");
        assert_eq!(
            format_difficulty(DifficultyStrategy::Dual, Some(&raw)).expect("valid"),
            "PoW: 3.00000025e+06, PoS: 0.10000000000000000555"
        );
    }

    #[test]
    fn dual_difficulty_requires_object() {
        assert!(format_difficulty(DifficultyStrategy::Dual, Some(&json!(12.5))).is_err());
        assert!(format_difficulty(DifficultyStrategy::Dual, None).is_err());
    }

    #[test]
    fn split_chain_label_maps_test_to_testnet() {
        let network = json!({"version": 90100, "protocolversion": 70002, "subversion": "/Peercoin:0.9.1/"});
        let difficulty = json!({"proof-of-work": 1.0, "proof-of-stake": 2.0});
        for (chain, expected) in [("main", LIVENET), ("test", TESTNET), ("regtest", LIVENET)] {
            let blockchain = json!({"chain": chain, "blocks": 10, "bestblockhash": "ab"});
            let info = from_split(&blockchain, &network, &difficulty, DifficultyStrategy::Dual)
                .expect("valid");
            assert_eq!(info.chain, expected, "chain {chain}");
            assert_eq!(info.version, "90100");
            assert_eq!(info.subversion, "/Peercoin:0.9.1/");
        }
    }

    #[test]
    fn legacy_reads_getinfo_flag() {
        let getinfo = json!({
            "version": "v1.0.0.0", "protocolversion": 60011, "blocks": 42,
            "timeoffset": -2, "testnet": true,
            "difficulty": {"proof-of-work": 1.5, "proof-of-stake": 2.5},
        });
        let info = from_legacy(&getinfo, &json!("ff"), DifficultyStrategy::Dual).expect("valid");
        assert_eq!(info.chain, TESTNET);
        assert_eq!(info.blocks, 42);
        assert_eq!(info.best_block_hash, "ff");
        assert_eq!(info.version, "v1.0.0.0");
        assert_eq!(info.protocol_version, "60011");
        assert_eq!(info.time_offset, -2.0);
        assert!(info.subversion.is_empty());
    }

    #[test]
    fn legacy_rejects_non_string_best_hash() {
        let getinfo = json!({"blocks": 1, "difficulty": 1.0});
        assert!(from_legacy(
            &getinfo,
            &Value::Null,
            DifficultyStrategy::PowWithFixedPos("1.0")
        )
        .is_err());
    }
}
