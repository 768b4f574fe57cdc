//! Transaction codec: canonical [`Tx`] <-> compact storage record.
//!
//! A packed record is the protobuf message in [`proto`] holding the
//! transaction plus two pieces of indexing metadata, height and block time.
//! Unpacking returns the height but not the block time; block time is
//! write-only from the codec's point of view.

pub mod proto;

use std::sync::Arc;

use bitcoin::hex::{DisplayHex, FromHex};
use num_bigint::BigUint;
use prost::Message;

use crate::chaincfg::ChainParameters;
use crate::error::CoreError;
use crate::types::{ScriptPubKey, ScriptSig, Tx, Vin, Vout};

use self::proto::proto_transaction::{VinType, VoutType};
use self::proto::ProtoTransaction;

const TXID_LEN: usize = 32;

/// Packs and unpacks transactions for one network.
#[derive(Debug, Clone)]
pub struct TxCodec {
    params: Arc<ChainParameters>,
}

impl TxCodec {
    pub fn new(params: Arc<ChainParameters>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ChainParameters {
        &self.params
    }

    /// Serialize `tx` with its indexing metadata.
    pub fn pack_tx(&self, tx: &Tx, height: u32, block_time: u64) -> Result<Vec<u8>, CoreError> {
        let vin = tx
            .vin
            .iter()
            .enumerate()
            .map(|(i, vi)| -> Result<VinType, CoreError> {
                Ok(VinType {
                    coinbase: vi.coinbase.clone().unwrap_or_default(),
                    txid: pack_txid(&vi.txid).map_err(|e| annotate(e, format!("vin {i} txid")))?,
                    vout: vi.vout,
                    script_sig_hex: decode_hex(&vi.script_sig.hex, || format!("vin {i} hex"))?,
                    sequence: vi.sequence,
                    addresses: vi.addresses.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let vout = tx
            .vout
            .iter()
            .enumerate()
            .map(|(i, vo)| -> Result<VoutType, CoreError> {
                Ok(VoutType {
                    value_sat: big_uint_to_bytes(&vo.value_sat),
                    n: vo.n,
                    script_pub_key_hex: decode_hex(&vo.script_pub_key.hex, || {
                        format!("vout {i} hex")
                    })?,
                    addresses: vo.script_pub_key.addresses.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let time = u64::try_from(tx.time).map_err(|_| CoreError::Encoding {
            field: "time".to_owned(),
            reason: format!("negative transaction time {}", tx.time),
        })?;

        let pt = ProtoTransaction {
            txid: pack_txid(&tx.txid).map_err(|e| annotate(e, "txid".to_owned()))?,
            hex: decode_hex(&tx.hex, || "hex".to_owned())?,
            blocktime: block_time,
            locktime: tx.lock_time,
            height,
            vin,
            vout,
            version: tx.version,
            time,
        };
        Ok(pt.encode_to_vec())
    }

    /// Inverse of [`pack_tx`](Self::pack_tx); returns the transaction and
    /// its height.
    pub fn unpack_tx(&self, buf: &[u8]) -> Result<(Tx, u32), CoreError> {
        let pt = ProtoTransaction::decode(buf)
            .map_err(|e| CoreError::Decoding(format!("protobuf: {e}")))?;

        let vin = pt
            .vin
            .into_iter()
            .map(|pti| -> Result<Vin, CoreError> {
                Ok(Vin {
                    coinbase: Some(pti.coinbase).filter(|c| !c.is_empty()),
                    txid: unpack_txid(&pti.txid)?,
                    vout: pti.vout,
                    script_sig: ScriptSig {
                        hex: pti.script_sig_hex.as_slice().to_lower_hex_string(),
                    },
                    sequence: pti.sequence,
                    addresses: pti.addresses,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let vout = pt
            .vout
            .into_iter()
            .map(|pto| Vout {
                n: pto.n,
                script_pub_key: ScriptPubKey {
                    hex: pto.script_pub_key_hex.as_slice().to_lower_hex_string(),
                    addresses: pto.addresses,
                },
                value_sat: BigUint::from_bytes_be(&pto.value_sat),
                json_value: None,
            })
            .collect();

        let time = i64::try_from(pt.time)
            .map_err(|_| CoreError::Decoding(format!("transaction time {} out of range", pt.time)))?;

        let tx = Tx {
            txid: unpack_txid(&pt.txid)?,
            version: pt.version,
            lock_time: pt.locktime,
            time,
            hex: pt.hex.as_slice().to_lower_hex_string(),
            vin,
            vout,
        };
        Ok((tx, pt.height))
    }
}

/// Compact form of a txid: its 32 raw bytes in display order. Coinbase
/// inputs have no previous txid and pack to an empty sequence.
pub fn pack_txid(txid: &str) -> Result<Vec<u8>, CoreError> {
    if txid.is_empty() {
        return Ok(Vec::new());
    }
    let bytes = Vec::<u8>::from_hex(txid).map_err(|e| CoreError::Encoding {
        field: "txid".to_owned(),
        reason: format!("{e}: {txid}"),
    })?;
    if bytes.len() != TXID_LEN {
        return Err(CoreError::Encoding {
            field: "txid".to_owned(),
            reason: format!("expected {TXID_LEN} bytes, got {}: {txid}", bytes.len()),
        });
    }
    Ok(bytes)
}

pub fn unpack_txid(buf: &[u8]) -> Result<String, CoreError> {
    match buf.len() {
        0 => Ok(String::new()),
        TXID_LEN => Ok(buf.to_lower_hex_string()),
        n => Err(CoreError::Decoding(format!(
            "packed txid must be {TXID_LEN} bytes, got {n}"
        ))),
    }
}

/// Minimal unsigned big-endian encoding; zero encodes as no bytes at all.
pub fn big_uint_to_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

fn decode_hex(hex: &str, field: impl FnOnce() -> String) -> Result<Vec<u8>, CoreError> {
    Vec::<u8>::from_hex(hex).map_err(|e| CoreError::Encoding {
        field: field(),
        reason: format!("{e}: {hex}"),
    })
}

fn annotate(err: CoreError, field: String) -> CoreError {
    match err {
        CoreError::Encoding { reason, .. } => CoreError::Encoding { field, reason },
        other => other,
    }
}
