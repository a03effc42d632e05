// Clock module - THE LEDGER'S NOTION OF TIME
// Polls the ledger for tick progress and publishes it to the monitor

mod source;

pub use source::{ClockConfig, TickClock};
