// Event Types - Envelope kinds assigned by the ledger to emitted events
// Only the four contract-message kinds carry decodable contract logs

use serde::{Deserialize, Serialize};

// ============================================================================
// EVENT TYPE
// ============================================================================

/// Envelope event kind codes as emitted by the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    CoinTransfer,
    AssetIssuance,
    AssetOwnershipChange,
    AssetPossessionChange,
    ContractErrorMessage,
    ContractWarningMessage,
    ContractInformationMessage,
    ContractDebugMessage,
    Burning,
    DustBurning,
    SpectrumStats,
    AssetOwnershipManagingContractChange,
    AssetPossessionManagingContractChange,
    CustomMessage,
    /// A code this crate does not recognize
    Unknown(u32),
}

impl EventType {
    /// Map a raw envelope code to its event kind
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::CoinTransfer,
            1 => Self::AssetIssuance,
            2 => Self::AssetOwnershipChange,
            3 => Self::AssetPossessionChange,
            4 => Self::ContractErrorMessage,
            5 => Self::ContractWarningMessage,
            6 => Self::ContractInformationMessage,
            7 => Self::ContractDebugMessage,
            8 => Self::Burning,
            9 => Self::DustBurning,
            10 => Self::SpectrumStats,
            11 => Self::AssetOwnershipManagingContractChange,
            12 => Self::AssetPossessionManagingContractChange,
            255 => Self::CustomMessage,
            other => Self::Unknown(other),
        }
    }

    /// Get the raw envelope code
    pub fn code(&self) -> u32 {
        match self {
            Self::CoinTransfer => 0,
            Self::AssetIssuance => 1,
            Self::AssetOwnershipChange => 2,
            Self::AssetPossessionChange => 3,
            Self::ContractErrorMessage => 4,
            Self::ContractWarningMessage => 5,
            Self::ContractInformationMessage => 6,
            Self::ContractDebugMessage => 7,
            Self::Burning => 8,
            Self::DustBurning => 9,
            Self::SpectrumStats => 10,
            Self::AssetOwnershipManagingContractChange => 11,
            Self::AssetPossessionManagingContractChange => 12,
            Self::CustomMessage => 255,
            Self::Unknown(other) => *other,
        }
    }

    /// Check if events of this kind carry a contract log payload
    pub fn is_contract_message(&self) -> bool {
        matches!(
            self,
            Self::ContractErrorMessage
                | Self::ContractWarningMessage
                | Self::ContractInformationMessage
                | Self::ContractDebugMessage
        )
    }
}

// ============================================================================
// LOG HEADER
// ============================================================================

/// Fixed 8-byte header at the start of every contract log payload
///
/// Layout (little-endian): `[0:4) contract index | [4:8) log code`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogHeader {
    pub contract_index: u32,
    pub log_code: u32,
}

/// Minimum payload length for a parseable log header
pub const LOG_HEADER_LEN: usize = 8;

impl LogHeader {
    /// Parse the header from raw payload bytes
    ///
    /// Returns None for payloads too short to contain a header; such records
    /// are skipped by the decoder, never fatal.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < LOG_HEADER_LEN {
            return None;
        }
        let contract_index = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let log_code = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Some(Self {
            contract_index,
            log_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip() {
        for code in [0u32, 4, 7, 12, 255, 9999] {
            assert_eq!(EventType::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_contract_message_kinds() {
        assert!(EventType::ContractErrorMessage.is_contract_message());
        assert!(EventType::ContractDebugMessage.is_contract_message());
        assert!(!EventType::CoinTransfer.is_contract_message());
        assert!(!EventType::Unknown(42).is_contract_message());
    }

    #[test]
    fn test_log_header_parse() {
        let mut data = vec![0u8; 8];
        data[0..4].copy_from_slice(&18u32.to_le_bytes());
        data[4..8].copy_from_slice(&3u32.to_le_bytes());

        let header = LogHeader::parse(&data).unwrap();
        assert_eq!(header.contract_index, 18);
        assert_eq!(header.log_code, 3);
    }

    #[test]
    fn test_log_header_too_short() {
        assert!(LogHeader::parse(&[1, 2, 3, 4, 5, 6]).is_none());
        assert!(LogHeader::parse(&[]).is_none());
    }
}
