// tickwatch - Transaction confirmation for tick-based ledgers
//
// A caller broadcasts a transaction out of band, registers a monitoring
// task, and learns asynchronously whether the transaction was accepted,
// rejected, or lost:
// - clock: polls the ledger and publishes the latest observed tick
// - decoder: extracts structured contract log entries from event bundles
// - monitor: drives pending tasks to exactly one success/failure callback
// - ledger: the query types and client trait the core consumes

pub mod clock;
pub mod decoder;
pub mod ledger;
pub mod monitor;
