// Decoder module - WHAT THE LEDGER SAID
// Extracts structured contract log entries from raw tick event bundles

mod event;
mod log;

pub use event::{EventType, LogHeader, LOG_HEADER_LEN};
pub use log::{
    decode_contract_logs, tx_log_outcome, DecodedLogEntry, LogType, TxLogOutcome,
    MIN_AMOUNT_RECORD_LEN, MIN_DEST_RECORD_LEN,
};
