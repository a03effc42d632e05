// Address Codec - Canonical rendering of fixed 32-byte ledger identifiers
// Destinations decoded from event logs are opaque until rendered here

use thiserror::Error;

/// Length of a raw ledger identifier in bytes
pub const ADDRESS_LEN: usize = 32;

/// Errors that can occur while encoding or decoding addresses
#[derive(Debug, Clone, Error)]
pub enum AddressError {
    #[error("Invalid address string: {0}")]
    InvalidString(String),

    #[error("Invalid address length: expected {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Converts a fixed 32-byte opaque identifier to and from its canonical
/// human-readable string form
pub trait AddressCodec: Send + Sync {
    /// Render a raw identifier as its canonical string
    fn encode(&self, raw: &[u8; ADDRESS_LEN]) -> String;

    /// Parse a canonical string back into a raw identifier
    fn decode(&self, address: &str) -> Result<[u8; ADDRESS_LEN], AddressError>;
}

/// Base58 address codec
#[derive(Clone, Copy, Debug, Default)]
pub struct Base58AddressCodec;

impl Base58AddressCodec {
    pub fn new() -> Self {
        Self
    }
}

impl AddressCodec for Base58AddressCodec {
    fn encode(&self, raw: &[u8; ADDRESS_LEN]) -> String {
        bs58::encode(raw).into_string()
    }

    fn decode(&self, address: &str) -> Result<[u8; ADDRESS_LEN], AddressError> {
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| AddressError::InvalidString(e.to_string()))?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(len))
    }
}
