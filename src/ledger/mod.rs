// Ledger module - WHAT THE LEDGER LOOKS LIKE
// Query types, the client trait the core consumes, and the address codec

mod address;
mod client;
mod types;

pub use address::{AddressCodec, AddressError, Base58AddressCodec, ADDRESS_LEN};
pub use client::{LedgerClient, LedgerError, MockLedgerClient};
pub use types::{EventRecord, FinalizedTx, TickEventBundle, TickInfo, TxEvents};
