//! Ethereum ABI encoding for the four contract functions the registry uses.
//!
//! Calldata is `selector ++ head ++ tail` with 32-byte words. Only the types
//! that appear in these signatures are supported.

use esg_crypto::selector;
use esg_types::{Address, ContentId, ReportStatus, TokenAmount};

use crate::error::{ChainError, ChainResult};

pub const REGISTER_CONTENT: &str = "registerContent(bytes32)";
pub const ATTEST_REPORT: &str = "attestReport(bytes32,bool,string)";
pub const GET_REPORT_STATUS: &str = "getReportStatus(bytes32)";
pub const BALANCE_OF: &str = "balanceOf(address)";

const WORD: usize = 32;
// Head of (bool,bool,bool,address,uint64,string).
const STATUS_HEAD_WORDS: usize = 6;

type Word = [u8; WORD];

fn call(signature: &str, words: &[Word], tail: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + words.len() * WORD + tail.len());
    data.extend_from_slice(&selector(signature));
    for w in words {
        data.extend_from_slice(w);
    }
    data.extend_from_slice(tail);
    data
}

fn word_bool(b: bool) -> Word {
    let mut w = [0u8; WORD];
    w[WORD - 1] = u8::from(b);
    w
}

fn word_uint(v: u128) -> Word {
    let mut w = [0u8; WORD];
    w[WORD - 16..].copy_from_slice(&v.to_be_bytes());
    w
}

fn word_address(a: &Address) -> Word {
    let mut w = [0u8; WORD];
    w[WORD - 20..].copy_from_slice(a.as_bytes());
    w
}

/// Length word followed by the bytes, right-padded to a word boundary.
fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&word_uint(bytes.len() as u128));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

pub fn encode_register_content(id: &ContentId) -> Vec<u8> {
    call(REGISTER_CONTENT, &[*id.as_bytes()], &[])
}

pub fn encode_attest_report(id: &ContentId, passed: bool, reason: &str) -> Vec<u8> {
    let offset = word_uint((3 * WORD) as u128);
    call(
        ATTEST_REPORT,
        &[*id.as_bytes(), word_bool(passed), offset],
        &encode_dynamic_bytes(reason.as_bytes()),
    )
}

pub fn encode_get_report_status(id: &ContentId) -> Vec<u8> {
    call(GET_REPORT_STATUS, &[*id.as_bytes()], &[])
}

pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    call(BALANCE_OF, &[word_address(owner)], &[])
}

/// Return data of `getReportStatus`, as a node would produce it.
pub fn encode_report_status(status: &ReportStatus) -> Vec<u8> {
    let mut out = Vec::with_capacity((STATUS_HEAD_WORDS + 2) * WORD);
    out.extend_from_slice(&word_bool(status.registered));
    out.extend_from_slice(&word_bool(status.attested));
    out.extend_from_slice(&word_bool(status.passed));
    out.extend_from_slice(&word_address(&status.attestor));
    out.extend_from_slice(&word_uint(u128::from(status.timestamp)));
    out.extend_from_slice(&word_uint((STATUS_HEAD_WORDS * WORD) as u128));
    out.extend_from_slice(&encode_dynamic_bytes(status.reason.as_bytes()));
    out
}

/// Return data of `balanceOf`.
pub fn encode_uint256(amount: &TokenAmount) -> Vec<u8> {
    word_uint(amount.base_units()).to_vec()
}

fn read_word(data: &[u8], index: usize) -> ChainResult<&[u8]> {
    let start = index * WORD;
    data.get(start..start + WORD).ok_or_else(|| {
        ChainError::Abi(format!(
            "return data too short: need word {index}, have {} bytes",
            data.len()
        ))
    })
}

fn read_uint(word: &[u8], bits: u32) -> ChainResult<u128> {
    let keep = (bits / 8) as usize;
    let (high, low) = word.split_at(WORD - keep);
    if high.iter().any(|b| *b != 0) {
        return Err(ChainError::Abi(format!("value does not fit in uint{bits}")));
    }
    let mut buf = [0u8; 16];
    buf[16 - keep..].copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

fn read_bool(word: &[u8]) -> ChainResult<bool> {
    match read_uint(word, 8)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ChainError::Abi(format!("invalid bool word: {other}"))),
    }
}

fn read_address(word: &[u8]) -> ChainResult<Address> {
    let (high, low) = word.split_at(WORD - 20);
    if high.iter().any(|b| *b != 0) {
        return Err(ChainError::Abi("dirty address word".into()));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(low);
    Ok(Address::new(bytes))
}

fn read_offset(word: &[u8]) -> ChainResult<usize> {
    usize::try_from(read_uint(word, 64)?).map_err(|_| ChainError::Abi("offset overflow".into()))
}

fn read_string(data: &[u8], offset: usize) -> ChainResult<String> {
    if offset % WORD != 0 {
        return Err(ChainError::Abi(format!("misaligned string offset {offset}")));
    }
    let len = read_offset(read_word(data, offset / WORD)?)?;
    let start = offset + WORD;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| ChainError::Abi(format!("string of {len} bytes runs past return data")))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| ChainError::Abi(format!("reason is not UTF-8: {e}")))
}

pub fn decode_report_status(data: &[u8]) -> ChainResult<ReportStatus> {
    let timestamp = read_uint(read_word(data, 4)?, 64)?;
    Ok(ReportStatus {
        registered: read_bool(read_word(data, 0)?)?,
        attested: read_bool(read_word(data, 1)?)?,
        passed: read_bool(read_word(data, 2)?)?,
        attestor: read_address(read_word(data, 3)?)?,
        timestamp: u64::try_from(timestamp).map_err(|_| ChainError::Abi("uint64 overflow".into()))?,
        reason: read_string(data, read_offset(read_word(data, 5)?)?)?,
    })
}

/// Decode a `uint256`; balances beyond `u128` are rejected.
pub fn decode_uint256(data: &[u8]) -> ChainResult<TokenAmount> {
    read_uint(read_word(data, 0)?, 128).map(TokenAmount::from_base_units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ContentId {
        ContentId::from_hash([0x11; 32])
    }

    #[test]
    fn register_calldata_layout() {
        let data = encode_register_content(&id());
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &selector(REGISTER_CONTENT));
        assert_eq!(&data[4..], id().as_bytes());
    }

    #[test]
    fn balance_of_uses_known_selector_and_left_pads() {
        let owner = Address::new([0xaa; 20]);
        let data = encode_balance_of(&owner);
        assert_eq!(hex::encode(&data[..4]), "70a08231");
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..], owner.as_bytes());
    }

    #[test]
    fn attest_calldata_places_string_in_tail() {
        let data = encode_attest_report(&id(), true, "ok");
        // selector + 3 head words + length word + one padded data word
        assert_eq!(data.len(), 4 + 5 * 32);
        let body = &data[4..];
        assert_eq!(body[63], 1);
        assert_eq!(body[95], 96);
        assert_eq!(body[127], 2);
        assert_eq!(&body[128..130], b"ok");
        assert!(body[130..].iter().all(|b| *b == 0));
    }

    #[test]
    fn attest_with_empty_reason_has_no_data_word() {
        let data = encode_attest_report(&id(), false, "");
        assert_eq!(data.len(), 4 + 4 * 32);
    }

    #[test]
    fn status_decodes_what_a_node_returns() {
        let status = ReportStatus {
            registered: true,
            attested: true,
            passed: false,
            attestor: Address::new([0x42; 20]),
            timestamp: 1_700_000_123,
            reason: "missing scope 3 emissions, see annex B for the full list".into(),
        };
        let decoded = decode_report_status(&encode_report_status(&status)).unwrap();
        assert_eq!(decoded, status);
    }

    #[test]
    fn unregistered_status_decodes_to_defaults() {
        let data = encode_report_status(&ReportStatus::unregistered());
        assert_eq!(data.len(), 7 * 32);
        assert_eq!(decode_report_status(&data).unwrap(), ReportStatus::unregistered());
    }

    #[test]
    fn truncated_status_is_rejected() {
        let data = encode_report_status(&ReportStatus::registered());
        assert!(matches!(decode_report_status(&data[..100]), Err(ChainError::Abi(_))));
    }

    #[test]
    fn string_running_past_the_end_is_rejected() {
        let mut data = encode_report_status(&ReportStatus::unregistered());
        data[6 * 32 + 31] = 200;
        assert!(matches!(decode_report_status(&data), Err(ChainError::Abi(_))));
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let mut data = encode_report_status(&ReportStatus::unregistered());
        data[31] = 2;
        assert!(matches!(decode_report_status(&data), Err(ChainError::Abi(_))));
    }

    #[test]
    fn uint256_decodes_and_rejects_overflow() {
        let amount = TokenAmount::from_tokens(123);
        assert_eq!(decode_uint256(&encode_uint256(&amount)).unwrap(), amount);
        let mut huge = [0u8; 32];
        huge[0] = 1;
        assert!(matches!(decode_uint256(&huge), Err(ChainError::Abi(_))));
    }
}
