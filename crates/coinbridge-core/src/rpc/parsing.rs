//! Daemon JSON to canonical model.
//!
//! Output values are kept as decimal text (`Vout::json_value`) during
//! parsing and converted to base units by [`normalize_values`], which needs
//! the coin's decimal count.

use num_bigint::BigUint;
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{BlockHeader, BlockInfo, ScriptPubKey, ScriptSig, Tx, Vin, Vout};

/// Largest decimal exponent accepted in an amount.
const MAX_AMOUNT_EXPONENT: i64 = 256;

// ==============================================================================
// Scalar Helpers
// ==============================================================================

pub(crate) fn parse_integer_required<T, const SIGNED: bool>(
    value: Option<&Value>,
    field: &str,
) -> Result<T, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    parse_integer::<T, SIGNED>(value, field)?
        .ok_or_else(|| CoreError::InvalidData(format!("missing {field}")))
}

/// Missing or `null` yields the default; a present value must still be in
/// range.
pub(crate) fn parse_integer_or_default<T, const SIGNED: bool>(
    value: Option<&Value>,
    field: &str,
) -> Result<T, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64> + Default,
{
    Ok(parse_integer::<T, SIGNED>(value, field)?.unwrap_or_default())
}

fn parse_integer<T, const SIGNED: bool>(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<T>, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let out_of_range = || CoreError::InvalidData(format!("{field} out of range: {value}"));

    if SIGNED {
        let n = value
            .as_i64()
            .ok_or_else(|| CoreError::InvalidData(format!("{field} is not an integer: {value}")))?;
        T::try_from(n).map(Some).map_err(|_| out_of_range())
    } else {
        let n = value.as_u64().ok_or_else(|| {
            CoreError::InvalidData(format!("{field} is not an unsigned integer: {value}"))
        })?;
        T::try_from(n).map(Some).map_err(|_| out_of_range())
    }
}

fn required_str<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a str, CoreError> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidData(format!("missing {field}")))
}

fn optional_string(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| CoreError::InvalidData(format!("{field} entry is not a string")))
            })
            .collect(),
        Some(other) => Err(CoreError::InvalidData(format!(
            "{field} is not an array: {other}"
        ))),
    }
}

/// Text of a number or string scalar as the daemon sent it.
///
/// Numbers keep their original digits (`serde_json` is built with
/// `arbitrary_precision`), so amounts past 2^53 are not rounded.
pub(crate) fn scalar_text(value: Option<&Value>, field: &str) -> Result<String, CoreError> {
    match value {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CoreError::InvalidData(format!(
            "{field} is not a number or string: {other}"
        ))),
        None => Err(CoreError::InvalidData(format!("missing {field}"))),
    }
}

// ==============================================================================
// Amounts
// ==============================================================================

/// Convert a decimal amount in whole coins to base units.
///
/// Digits beyond `decimals` are truncated, never rounded. Exponent notation
/// (`1e-8`, `2.5E3`) is accepted. Negative amounts are rejected.
pub fn amount_to_big_uint(text: &str, decimals: u32) -> Result<BigUint, CoreError> {
    let invalid = |reason: &str| CoreError::InvalidData(format!("invalid amount `{text}`: {reason}"));

    let s = text.trim();
    if s.starts_with('-') {
        return Err(invalid("negative"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let (mantissa, exponent) = match s.find(|c| c == 'e' || c == 'E') {
        Some(i) => {
            let exponent = s[i + 1..]
                .parse::<i64>()
                .map_err(|_| invalid("bad exponent"))?;
            if exponent.abs() > MAX_AMOUNT_EXPONENT {
                return Err(invalid("exponent out of range"));
            }
            (&s[..i], exponent)
        }
        None => (s, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(invalid("not a decimal number"));
    }

    // value = digits * 10^shift
    let mut digits = format!("{int_part}{frac_part}");
    let shift = exponent + i64::from(decimals) - frac_part.len() as i64;
    if shift >= 0 {
        digits.extend(std::iter::repeat('0').take(shift as usize));
    } else {
        let keep = digits.len() as i64 + shift;
        if keep <= 0 {
            return Ok(BigUint::default());
        }
        digits.truncate(keep as usize);
    }

    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| invalid("not a decimal number"))
}

/// Convert every output's decimal text to base units and clear it.
pub fn normalize_values(tx: &mut Tx, decimals: u32) -> Result<(), CoreError> {
    for vout in &mut tx.vout {
        if let Some(text) = vout.json_value.take() {
            vout.value_sat = amount_to_big_uint(&text, decimals).map_err(|e| {
                CoreError::InvalidData(format!("tx {} vout {}: {e}", tx.txid, vout.n))
            })?;
        }
    }
    Ok(())
}

// ==============================================================================
// Transactions
// ==============================================================================

/// Parse a verbose transaction object. Output values stay as text.
pub fn parse_tx(raw: &Value) -> Result<Tx, CoreError> {
    let txid = required_str(raw.get("txid"), "txid")?.to_owned();
    let version = parse_integer_required::<i32, true>(raw.get("version"), "version")?;
    let lock_time = parse_integer_required::<u32, false>(raw.get("locktime"), "locktime")?;
    let time = parse_integer_or_default::<i64, true>(raw.get("time"), "time")?;

    let vin = raw
        .get("vin")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::InvalidData(format!("tx {txid}: missing vin array")))?;
    let vout = raw
        .get("vout")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::InvalidData(format!("tx {txid}: missing vout array")))?;

    let with_txid = |e: CoreError| CoreError::InvalidData(format!("tx {txid}: {e}"));
    let vin = parse_vin(vin).map_err(with_txid)?;
    let vout = parse_vout(vout).map_err(with_txid)?;

    Ok(Tx {
        hex: optional_string(raw.get("hex")),
        txid,
        version,
        lock_time,
        time,
        vin,
        vout,
    })
}

fn parse_vin(vin: &[Value]) -> Result<Vec<Vin>, CoreError> {
    vin.iter()
        .map(|input| {
            let sequence = parse_integer_required::<u32, false>(input.get("sequence"), "sequence")?;
            let marker = input.get("coinbase").and_then(Value::as_str);
            // The packed record has no room for an empty marker.
            let coinbase = marker.filter(|c| !c.is_empty()).map(str::to_owned);

            let (txid, vout) = if marker.is_some() {
                (String::new(), 0)
            } else {
                (
                    required_str(input.get("txid"), "vin.txid")?.to_owned(),
                    parse_integer_required::<u32, false>(input.get("vout"), "vin.vout")?,
                )
            };

            Ok(Vin {
                coinbase,
                txid,
                vout,
                script_sig: ScriptSig {
                    hex: optional_string(input.get("scriptSig").and_then(|s| s.get("hex"))),
                },
                sequence,
                addresses: string_list(input.get("addresses"), "vin.addresses")?,
            })
        })
        .collect()
}

fn parse_vout(vout: &[Value]) -> Result<Vec<Vout>, CoreError> {
    vout.iter()
        .map(|output| {
            let json_value = scalar_text(output.get("value"), "vout.value")?;
            let n = parse_integer_required::<u32, false>(output.get("n"), "vout.n")?;
            let spk = output
                .get("scriptPubKey")
                .ok_or_else(|| CoreError::InvalidData("missing scriptPubKey in vout".into()))?;

            Ok(Vout {
                n,
                script_pub_key: ScriptPubKey {
                    hex: optional_string(spk.get("hex")),
                    addresses: string_list(spk.get("addresses"), "scriptPubKey.addresses")?,
                },
                value_sat: BigUint::default(),
                json_value: Some(json_value),
            })
        })
        .collect()
}

// ==============================================================================
// Blocks
// ==============================================================================

pub fn parse_block_header(raw: &Value) -> Result<BlockHeader, CoreError> {
    Ok(BlockHeader {
        hash: required_str(raw.get("hash"), "hash")?.to_owned(),
        prev: optional_string(raw.get("previousblockhash")),
        next: optional_string(raw.get("nextblockhash")),
        height: parse_integer_required::<u32, false>(raw.get("height"), "height")?,
        confirmations: parse_integer_or_default::<i64, true>(
            raw.get("confirmations"),
            "confirmations",
        )?,
        size: parse_integer_or_default::<u32, false>(raw.get("size"), "size")?,
        time: parse_integer_or_default::<i64, true>(raw.get("time"), "time")?,
    })
}

/// Parse a `getblock` result at txid verbosity.
///
/// Entries of `tx` may be plain txids or, from daemons that ignore the
/// verbosity flag, full objects; in the latter case only `txid` is kept.
pub fn parse_block_info(raw: &Value) -> Result<BlockInfo, CoreError> {
    let header = parse_block_header(raw)?;
    let txids = block_tx_entries(raw)?
        .iter()
        .map(|entry| match entry {
            Value::String(txid) => Ok(txid.clone()),
            Value::Object(_) => required_str(entry.get("txid"), "tx.txid").map(str::to_owned),
            other => Err(CoreError::InvalidData(format!(
                "block {}: unexpected tx entry {other}",
                header.hash
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BlockInfo {
        version: parse_integer_or_default::<i64, true>(raw.get("version"), "version")?,
        merkle_root: optional_string(raw.get("merkleroot")),
        nonce: parse_integer_or_default::<u64, false>(raw.get("nonce"), "nonce")?,
        bits: optional_string(raw.get("bits")),
        header,
        txids,
    })
}

/// Parse the transaction objects of a detailed `getblock` result.
pub fn parse_block_txs(raw: &Value) -> Result<Vec<Tx>, CoreError> {
    block_tx_entries(raw)?
        .iter()
        .map(|entry| match entry {
            Value::Object(_) => parse_tx(entry),
            other => Err(CoreError::InvalidData(format!(
                "expected transaction object in detailed block, got {other}"
            ))),
        })
        .collect()
}

fn block_tx_entries(raw: &Value) -> Result<&[Value], CoreError> {
    match raw.get("tx") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => Err(CoreError::InvalidData(format!(
            "block tx is not an array: {other}"
        ))),
    }
}
