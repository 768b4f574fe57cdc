//! Shared test helpers for `coinbridge-core` unit tests.
//!
//! Holds the reference transaction used across codec, normalizer and
//! adapter tests, together with the daemon JSON it was parsed from and its
//! packed form.

use num_bigint::BigUint;

use crate::types::{ScriptPubKey, ScriptSig, Tx, Vin, Vout};

// ==============================================================================
// Reference Transaction
// ==============================================================================

pub const FIXTURE_TXID: &str = "b7724cdac78bd4d8ec7e19c9c7b53adfd095afc4ae478fc79a7936a0a6a4a29b";
pub const FIXTURE_HEIGHT: u32 = 123456;
pub const FIXTURE_BLOCK_TIME: u64 = 1526881087;

pub const FIXTURE_RAW_HEX: &str = "01000000eb5a025b0137699807c5b6e84c9fd558226c723f4b33aa53421456535b4431d0434b9d6dea010000006b483045022100ca490f7225874a7177a33c920b5a6ca2fa0e23e5aa6a59d8345335d92d3b478702202ce6504c93c643f15071e2051dc6b39ff2262cff4caef86a3403dac8197219fb012103b23813d1e0e783e825fe3a754935e0d060e6e4c6ace28a3e28fe91ac92585d95ffffffff0278499fe3078b00001976a914c1cd13a152e14586714e3081f7b02563fc3fbefb88ac00ca9a3b000000001976a9144ede88857a16efb6a088c7add2687c40d250875788ac00000000";

const FIXTURE_SCRIPT_SIG: &str = "483045022100ca490f7225874a7177a33c920b5a6ca2fa0e23e5aa6a59d8345335d92d3b478702202ce6504c93c643f15071e2051dc6b39ff2262cff4caef86a3403dac8197219fb012103b23813d1e0e783e825fe3a754935e0d060e6e4c6ace28a3e28fe91ac92585d95";

/// `FIXTURE_TXID` packed at `FIXTURE_HEIGHT` / `FIXTURE_BLOCK_TIME`.
pub const FIXTURE_PACKED_HEX: &str = "0a20b7724cdac78bd4d8ec7e19c9c7b53adfd095afc4ae478fc79a7936a0a6a4a29b12e60101000000eb5a025b0137699807c5b6e84c9fd558226c723f4b33aa53421456535b4431d0434b9d6dea010000006b483045022100ca490f7225874a7177a33c920b5a6ca2fa0e23e5aa6a59d8345335d92d3b478702202ce6504c93c643f15071e2051dc6b39ff2262cff4caef86a3403dac8197219fb012103b23813d1e0e783e825fe3a754935e0d060e6e4c6ace28a3e28fe91ac92585d95ffffffff0278499fe3078b00001976a914c1cd13a152e14586714e3081f7b02563fc3fbefb88ac00ca9a3b000000001976a9144ede88857a16efb6a088c7add2687c40d250875788ac0000000018bfb689d805200028c0c4073299010a001220ea6d9d4b43d031445b5356144253aa334b3f726c2258d59f4ce8b6c5079869371801226b483045022100ca490f7225874a7177a33c920b5a6ca2fa0e23e5aa6a59d8345335d92d3b478702202ce6504c93c643f15071e2051dc6b39ff2262cff4caef86a3403dac8197219fb012103b23813d1e0e783e825fe3a754935e0d060e6e4c6ace28a3e28fe91ac92585d9528ffffffff0f3a490a068b07e39f497810001a1976a914c1cd13a152e14586714e3081f7b02563fc3fbefb88ac222243613863663350715946317576705a56796d574c747a78766f596f4d7056564b76343a470a043b9aca0010011a1976a9144ede88857a16efb6a088c7add2687c40d250875788ac222243506575727454324343666178755856516f41327354534b6f6f4b6f316f79766353400148ebb589d805";

/// The reference transaction in canonical form.
pub fn fixture_tx() -> Tx {
    Tx {
        txid: FIXTURE_TXID.to_owned(),
        version: 1,
        lock_time: 0,
        time: 1526881003,
        hex: FIXTURE_RAW_HEX.to_owned(),
        vin: vec![Vin {
            coinbase: None,
            txid: "ea6d9d4b43d031445b5356144253aa334b3f726c2258d59f4ce8b6c507986937".to_owned(),
            vout: 1,
            script_sig: ScriptSig {
                hex: FIXTURE_SCRIPT_SIG.to_owned(),
            },
            sequence: 4294967295,
            addresses: Vec::new(),
        }],
        vout: vec![
            make_vout(
                0,
                152865999899000,
                "76a914c1cd13a152e14586714e3081f7b02563fc3fbefb88ac",
                "Ca8cf3PqYF1uvpZVymWLtzxvoYoMpVVKv4",
            ),
            make_vout(
                1,
                1000000000,
                "76a9144ede88857a16efb6a088c7add2687c40d250875788ac",
                "CPeurtT2CCfaxuXVQoA2sTSKooKo1oyvcS",
            ),
        ],
    }
}

/// `getrawtransaction <FIXTURE_TXID> 1` result as an 8-decimal daemon
/// reports it, including the repeated `time` key.
pub fn fixture_tx_json() -> String {
    format!(
        r#"{{"hex":"{FIXTURE_RAW_HEX}","txid":"{FIXTURE_TXID}","version":1,"time":1526881003,"locktime":0,
"vin":[{{"txid":"ea6d9d4b43d031445b5356144253aa334b3f726c2258d59f4ce8b6c507986937","vout":1,
"scriptSig":{{"asm":"","hex":"{FIXTURE_SCRIPT_SIG}"}},"sequence":4294967295}}],
"vout":[{{"value":1528659.99899,"n":0,"scriptPubKey":{{"hex":"76a914c1cd13a152e14586714e3081f7b02563fc3fbefb88ac","type":"pubkeyhash","addresses":["Ca8cf3PqYF1uvpZVymWLtzxvoYoMpVVKv4"]}}}},
{{"value":10.0,"n":1,"scriptPubKey":{{"hex":"76a9144ede88857a16efb6a088c7add2687c40d250875788ac","type":"pubkeyhash","addresses":["CPeurtT2CCfaxuXVQoA2sTSKooKo1oyvcS"]}}}}],
"blockhash":"00000000000000f1ab3c5c1a4d1e8f1a9b6a7f1c2d3e4f5a6b7c8d9e0f1a2b3c","confirmations":10,"time":1526881087,"blocktime":1526881087}}"#
    )
}

pub fn make_vout(n: u32, sats: u64, script_hex: &str, address: &str) -> Vout {
    Vout {
        n,
        script_pub_key: ScriptPubKey {
            hex: script_hex.to_owned(),
            addresses: vec![address.to_owned()],
        },
        value_sat: BigUint::from(sats),
        json_value: None,
    }
}

/// A coinbase transaction with an empty-script zero-value output.
pub fn coinbase_tx() -> Tx {
    Tx {
        txid: "1111111111111111111111111111111111111111111111111111111111111111".to_owned(),
        version: 1,
        lock_time: 0,
        time: 1526880000,
        hex: "01000000".to_owned(),
        vin: vec![Vin {
            coinbase: Some("03e20100".to_owned()),
            txid: String::new(),
            vout: 0,
            script_sig: ScriptSig::default(),
            sequence: 4294967295,
            addresses: vec!["Ca8cf3PqYF1uvpZVymWLtzxvoYoMpVVKv4".to_owned()],
        }],
        vout: vec![Vout {
            n: 0,
            script_pub_key: ScriptPubKey::default(),
            value_sat: BigUint::from(0u8),
            json_value: None,
        }],
    }
}

/// A deterministic 64-char txid distinguished by one byte.
pub fn txid_from_byte(b: u8) -> String {
    format!("{b:02x}").repeat(32)
}

/// Wrap `result` in a JSON-RPC success envelope.
pub fn ok_body(result: &str) -> String {
    format!(r#"{{"result":{result},"error":null,"id":1}}"#)
}

/// A JSON-RPC error envelope.
pub fn err_body(code: i64, message: &str) -> String {
    format!(r#"{{"result":null,"error":{{"code":{code},"message":"{message}"}},"id":1}}"#)
}

// ==============================================================================
// Log Capture
// ==============================================================================

/// In-memory sink for `tracing` output; clones share one buffer.
#[derive(Clone, Default)]
pub struct LogBuffer(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Route events on the current thread into this buffer until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
