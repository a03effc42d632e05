// Log Decoder - Structured contract log entries from raw tick event bundles
// Implements the fixed little-endian wire layout of sale contract logs

use crate::decoder::{EventType, LogHeader};
use crate::ledger::{AddressCodec, TickEventBundle, ADDRESS_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// WIRE LAYOUT
// ============================================================================

// [0:4) contract index u32-LE | [4:8) log code u32-LE |
// [8:40) destination 32 bytes | [40:48) amount i64-LE
const DEST_OFFSET: usize = 8;
const AMOUNT_OFFSET: usize = 40;

/// Minimum record length carrying a destination identifier
pub const MIN_DEST_RECORD_LEN: usize = 44;

/// Minimum record length carrying a destination and an amount
pub const MIN_AMOUNT_RECORD_LEN: usize = 48;

// ============================================================================
// LOG TYPE
// ============================================================================

/// Outcome codes emitted by the sale contract
///
/// `Success` is the single success code; every other code is a failure with
/// a distinct diagnostic meaning. Codes this crate does not recognize are
/// surfaced as `Unknown` rather than coerced to success or failure silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    Success,
    InvalidStartEpoch,
    InvalidSaleAmount,
    InvalidPrice,
    InvalidPercent,
    InvalidTransfer,
    SaleOverflow,
    SaleNotFound,
    InvalidAmount,
    InvalidEpoch,
    InsufficientFunds,
    Unknown(u32),
}

impl LogType {
    /// Map a raw outcome code to its log type
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::InvalidStartEpoch,
            2 => Self::InvalidSaleAmount,
            3 => Self::InvalidPrice,
            4 => Self::InvalidPercent,
            5 => Self::InvalidTransfer,
            6 => Self::SaleOverflow,
            7 => Self::SaleNotFound,
            8 => Self::InvalidAmount,
            9 => Self::InvalidEpoch,
            10 => Self::InsufficientFunds,
            other => Self::Unknown(other),
        }
    }

    /// Get the raw outcome code
    pub fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::InvalidStartEpoch => 1,
            Self::InvalidSaleAmount => 2,
            Self::InvalidPrice => 3,
            Self::InvalidPercent => 4,
            Self::InvalidTransfer => 5,
            Self::SaleOverflow => 6,
            Self::SaleNotFound => 7,
            Self::InvalidAmount => 8,
            Self::InvalidEpoch => 9,
            Self::InsufficientFunds => 10,
            Self::Unknown(other) => *other,
        }
    }

    /// Check if this is the designated success code
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human-readable diagnostic for this outcome
    pub fn message(&self) -> String {
        match self {
            Self::Success => "Transaction successful".to_string(),
            Self::InvalidStartEpoch => {
                "Invalid start epoch - must be in a future epoch".to_string()
            }
            Self::InvalidSaleAmount => {
                "Invalid sale amount - must match tokens transferred to the contract".to_string()
            }
            Self::InvalidPrice => "Invalid price - all prices must be greater than zero".to_string(),
            Self::InvalidPercent => "Invalid percent - distribution percentages do not sum up".to_string(),
            Self::InvalidTransfer => "Failed to transfer tokens to the contract".to_string(),
            Self::SaleOverflow => "Maximum number of sales reached".to_string(),
            Self::SaleNotFound => "Sale not found".to_string(),
            Self::InvalidAmount => "Invalid amount - exceeds remaining supply".to_string(),
            Self::InvalidEpoch => "Sale is not active in the current epoch".to_string(),
            Self::InsufficientFunds => "Insufficient funds for purchase".to_string(),
            Self::Unknown(code) => format!("Unknown outcome code {}", code),
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::InvalidStartEpoch => write!(f, "INVALID_START_EPOCH"),
            Self::InvalidSaleAmount => write!(f, "INVALID_SALE_AMOUNT"),
            Self::InvalidPrice => write!(f, "INVALID_PRICE"),
            Self::InvalidPercent => write!(f, "INVALID_PERCENT"),
            Self::InvalidTransfer => write!(f, "INVALID_TRANSFER"),
            Self::SaleOverflow => write!(f, "SALE_OVERFLOW"),
            Self::SaleNotFound => write!(f, "SALE_NOT_FOUND"),
            Self::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            Self::InvalidEpoch => write!(f, "INVALID_EPOCH"),
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
            Self::Unknown(code) => write!(f, "UNKNOWN_{}", code),
        }
    }
}

// ============================================================================
// DECODED LOG ENTRY
// ============================================================================

/// One structured log entry extracted from a tick event bundle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedLogEntry {
    tick: u64,
    tx_id: String,
    event_id: u64,
    log_type: LogType,
    destination: Option<[u8; ADDRESS_LEN]>,
    amount: Option<i64>,
}

impl DecodedLogEntry {
    /// Get the tick the entry was emitted in
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Get the transaction that produced the entry
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Get the event sequence number within the tick
    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    /// Get the decoded outcome code
    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    /// Check if this entry carries the success code
    pub fn is_success(&self) -> bool {
        self.log_type.is_success()
    }

    /// Get the raw destination identifier, if the record carried one
    pub fn destination(&self) -> Option<&[u8; ADDRESS_LEN]> {
        self.destination.as_ref()
    }

    /// Get the amount, if the record carried one
    pub fn amount(&self) -> Option<i64> {
        self.amount
    }

    /// Render the destination through an address codec
    pub fn destination_display(&self, codec: &dyn AddressCodec) -> Option<String> {
        self.destination.as_ref().map(|raw| codec.encode(raw))
    }

    /// Render the destination as lowercase hex, for logs and diagnostics
    pub fn destination_hex(&self) -> Option<String> {
        self.destination.as_ref().map(hex::encode)
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode all log entries emitted by one contract during a tick
///
/// Entries come out in the same order their source records appear in the
/// bundle: transaction order, then intra-transaction event order. That order
/// is semantically significant - the last entry for a transaction is
/// authoritative for its outcome. Records that are not contract messages,
/// belong to a different contract, or are too short for a header are skipped.
pub fn decode_contract_logs(
    bundle: &TickEventBundle,
    contract_index: u32,
) -> Vec<DecodedLogEntry> {
    let mut entries = Vec::new();

    for tx in bundle.tx_events() {
        for event in tx.events() {
            if !EventType::from_code(event.event_type()).is_contract_message() {
                continue;
            }

            let Some(header) = LogHeader::parse(event.data()) else {
                continue;
            };
            if header.contract_index != contract_index {
                continue;
            }

            entries.push(DecodedLogEntry {
                tick: bundle.tick(),
                tx_id: tx.tx_id().to_string(),
                event_id: event.event_id(),
                log_type: LogType::from_code(header.log_code),
                destination: parse_destination(event.data()),
                amount: parse_amount(event.data()),
            });
        }
    }

    entries
}

fn parse_destination(data: &[u8]) -> Option<[u8; ADDRESS_LEN]> {
    if data.len() < MIN_DEST_RECORD_LEN {
        return None;
    }
    data[DEST_OFFSET..DEST_OFFSET + ADDRESS_LEN].try_into().ok()
}

fn parse_amount(data: &[u8]) -> Option<i64> {
    if data.len() < MIN_AMOUNT_RECORD_LEN {
        return None;
    }
    let bytes: [u8; 8] = data[AMOUNT_OFFSET..AMOUNT_OFFSET + 8].try_into().ok()?;
    Some(i64::from_le_bytes(bytes))
}

// ============================================================================
// PER-TRANSACTION OUTCOME
// ============================================================================

/// Outcome of a single transaction according to its decoded log entries
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxLogOutcome {
    /// The bundle contained no log entries for the transaction
    NoLogFound,
    /// The last log entry for the transaction, in emission order
    Resolved(LogType),
}

impl TxLogOutcome {
    /// Check if the transaction succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Resolved(log_type) if log_type.is_success())
    }
}

/// Resolve one transaction's outcome from a tick event bundle
///
/// A transaction can emit a sequence of log lines; the last one wins.
pub fn tx_log_outcome(
    bundle: &TickEventBundle,
    contract_index: u32,
    tx_id: &str,
) -> TxLogOutcome {
    decode_contract_logs(bundle, contract_index)
        .into_iter()
        .filter(|entry| entry.tx_id() == tx_id)
        .next_back()
        .map(|entry| TxLogOutcome::Resolved(entry.log_type()))
        .unwrap_or(TxLogOutcome::NoLogFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_type_code_round_trip() {
        for code in 0..=10u32 {
            assert_eq!(LogType::from_code(code).code(), code);
        }
        assert_eq!(LogType::from_code(77), LogType::Unknown(77));
        assert_eq!(LogType::Unknown(77).code(), 77);
    }

    #[test]
    fn test_only_success_code_is_success() {
        assert!(LogType::Success.is_success());
        for code in 1..=10u32 {
            assert!(!LogType::from_code(code).is_success());
        }
        assert!(!LogType::Unknown(0xdead).is_success());
    }

    #[test]
    fn test_unknown_display() {
        assert_eq!(LogType::Unknown(42).to_string(), "UNKNOWN_42");
    }
}
