// Ledger Types - Wire-facing data returned by the ledger's query endpoints
// Tick progress, finalized transaction lists, and raw per-tick event bundles

use crate::ledger::LedgerError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TICK INFO
// ============================================================================

/// Current progress of the ledger as reported by the tick query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    /// The ledger's discrete progress counter
    pub tick: u64,
    /// The larger epoch grouping the tick belongs to
    pub epoch: u32,
}

impl TickInfo {
    pub fn new(tick: u64, epoch: u32) -> Self {
        Self { tick, epoch }
    }
}

impl fmt::Display for TickInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} (epoch {})", self.tick, self.epoch)
    }
}

// ============================================================================
// FINALIZED TRANSACTION
// ============================================================================

/// One entry of the finalized transaction list for a tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedTx {
    tx_id: String,
    source: String,
    destination: String,
    amount: u64,
    tick: u64,
}

impl FinalizedTx {
    /// Create a new finalized transaction entry
    pub fn new(tx_id: &str, source: &str, destination: &str, amount: u64, tick: u64) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            amount,
            tick,
        }
    }

    /// Get the ledger-assigned transaction identifier
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Get the source address
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the destination address
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Get the transferred amount
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Get the tick the transaction was finalized in
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

// ============================================================================
// EVENT RECORD
// ============================================================================

/// A single raw event record emitted during contract execution
///
/// The `event_type` field is the envelope kind assigned by the ledger
/// (transfer, asset change, contract message, ...); the payload bytes carry
/// their own contract-specific header on top of that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    event_id: u64,
    event_type: u32,
    data: Vec<u8>,
}

impl EventRecord {
    /// Create an event record from raw payload bytes
    pub fn new(event_id: u64, event_type: u32, data: Vec<u8>) -> Self {
        Self {
            event_id,
            event_type,
            data,
        }
    }

    /// Create an event record from the base64 payload used on the wire
    pub fn from_base64(event_id: u64, event_type: u32, data: &str) -> Result<Self, LedgerError> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| LedgerError::InvalidEventData(e.to_string()))?;
        Ok(Self::new(event_id, event_type, bytes))
    }

    /// Get the sequence number of this event within its tick
    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    /// Get the envelope event kind code
    pub fn event_type(&self) -> u32 {
        self.event_type
    }

    /// Get the raw payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

// ============================================================================
// PER-TRANSACTION EVENTS
// ============================================================================

/// All events emitted by a single transaction, in emission order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEvents {
    tx_id: String,
    events: Vec<EventRecord>,
}

impl TxEvents {
    /// Create an event group for a transaction
    pub fn new(tx_id: &str, events: Vec<EventRecord>) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            events,
        }
    }

    /// Get the transaction identifier
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Get the events in emission order
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

// ============================================================================
// TICK EVENT BUNDLE
// ============================================================================

/// All event records emitted during one ledger tick, grouped by transaction
///
/// Immutable once fetched; ordering within and across transactions is
/// preserved exactly as the ledger emitted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEventBundle {
    tick: u64,
    tx_events: Vec<TxEvents>,
}

impl TickEventBundle {
    /// Create a bundle for a tick
    pub fn new(tick: u64, tx_events: Vec<TxEvents>) -> Self {
        Self { tick, tx_events }
    }

    /// Get the tick this bundle belongs to
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Get the per-transaction event groups
    pub fn tx_events(&self) -> &[TxEvents] {
        &self.tx_events
    }

    /// Number of transactions that emitted events in this tick
    pub fn tx_count(&self) -> usize {
        self.tx_events.len()
    }

    /// Total number of event records in this bundle
    pub fn event_count(&self) -> usize {
        self.tx_events.iter().map(|tx| tx.events().len()).sum()
    }
}
