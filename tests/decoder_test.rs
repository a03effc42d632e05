// Decoder Tests
// Binary contract log extraction from tick event bundles

use tickwatch::decoder::{
    decode_contract_logs, tx_log_outcome, EventType, LogType, TxLogOutcome,
};
use tickwatch::ledger::{
    AddressCodec, Base58AddressCodec, EventRecord, TickEventBundle, TxEvents,
};

const CONTRACT: u32 = 18;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build a contract log record of `len` payload bytes
fn log_record(event_id: u64, contract: u32, code: u32, len: usize) -> EventRecord {
    let mut data = vec![0u8; len];
    if len >= 4 {
        data[0..4].copy_from_slice(&contract.to_le_bytes());
    }
    if len >= 8 {
        data[4..8].copy_from_slice(&code.to_le_bytes());
    }
    if len >= 40 {
        // recognizable destination pattern
        for (i, byte) in data[8..40].iter_mut().enumerate() {
            *byte = i as u8;
        }
    }
    if len >= 48 {
        data[40..48].copy_from_slice(&(-500i64).to_le_bytes());
    }
    EventRecord::new(
        event_id,
        EventType::ContractInformationMessage.code(),
        data,
    )
}

fn bundle_of(tick: u64, tx_events: Vec<TxEvents>) -> TickEventBundle {
    TickEventBundle::new(tick, tx_events)
}

// ============================================================================
// RECORD FILTERING
// ============================================================================

#[test]
fn test_non_contract_message_envelope_skipped() {
    let transfer = EventRecord::new(0, EventType::CoinTransfer.code(), vec![0u8; 48]);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![transfer])]);

    assert!(decode_contract_logs(&bundle, CONTRACT).is_empty());
}

#[test]
fn test_other_contract_filtered_out() {
    let record = log_record(0, CONTRACT + 1, 0, 48);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    assert!(decode_contract_logs(&bundle, CONTRACT).is_empty());
}

#[test]
fn test_truncated_record_skipped_not_fatal() {
    let short = EventRecord::new(0, EventType::ContractErrorMessage.code(), vec![1u8; 6]);
    let good = log_record(1, CONTRACT, 0, 48);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![short, good])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event_id(), 1);
}

// ============================================================================
// BODY PARSING
// ============================================================================

#[test]
fn test_full_record_decodes_destination_and_amount() {
    let record = log_record(7, CONTRACT, 0, 48);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.tick(), 100);
    assert_eq!(entry.tx_id(), "tx-a");
    assert_eq!(entry.log_type(), LogType::Success);
    assert!(entry.is_success());

    let dest = entry.destination().unwrap();
    assert_eq!(dest[0], 0);
    assert_eq!(dest[31], 31);
    assert_eq!(entry.amount(), Some(-500));
}

#[test]
fn test_44_byte_record_has_destination_only() {
    let record = log_record(0, CONTRACT, 3, 44);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].destination().is_some());
    assert_eq!(entries[0].amount(), None);
}

#[test]
fn test_header_only_record_has_empty_payload_fields() {
    let record = log_record(0, CONTRACT, 10, 8);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type(), LogType::InsufficientFunds);
    assert!(entries[0].destination().is_none());
    assert!(entries[0].amount().is_none());
}

#[test]
fn test_unknown_outcome_code_surfaced() {
    let record = log_record(0, CONTRACT, 99, 48);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(entries[0].log_type(), LogType::Unknown(99));
    assert!(!entries[0].is_success());
    assert_eq!(entries[0].log_type().to_string(), "UNKNOWN_99");
}

#[test]
fn test_destination_render_through_codec() {
    let codec = Base58AddressCodec::new();
    let record = log_record(0, CONTRACT, 0, 48);
    let bundle = bundle_of(100, vec![TxEvents::new("tx-a", vec![record])]);

    let entries = decode_contract_logs(&bundle, CONTRACT);
    let rendered = entries[0].destination_display(&codec).unwrap();

    let expected: [u8; 32] = (0..32u8).collect::<Vec<_>>().try_into().unwrap();
    assert_eq!(codec.decode(&rendered).unwrap(), expected);

    let hex = entries[0].destination_hex().unwrap();
    assert!(hex.starts_with("000102030405"));
    assert_eq!(hex.len(), 64);
}

#[test]
fn test_base64_wire_ingest() {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let raw = log_record(3, CONTRACT, 0, 48);
    let encoded = STANDARD.encode(raw.data());
    let record = EventRecord::from_base64(
        3,
        EventType::ContractInformationMessage.code(),
        &encoded,
    )
    .unwrap();

    assert_eq!(record, raw);
}

// ============================================================================
// ORDERING AND DETERMINISM
// ============================================================================

#[test]
fn test_order_preserved_across_transactions() {
    let bundle = bundle_of(
        100,
        vec![
            TxEvents::new(
                "tx-a",
                vec![log_record(0, CONTRACT, 1, 48), log_record(1, CONTRACT, 2, 48)],
            ),
            TxEvents::new("tx-b", vec![log_record(2, CONTRACT, 0, 48)]),
        ],
    );

    let entries = decode_contract_logs(&bundle, CONTRACT);
    let ids: Vec<u64> = entries.iter().map(|e| e.event_id()).collect();
    assert_eq!(ids, vec![0, 1, 2]);

    let txs: Vec<&str> = entries.iter().map(|e| e.tx_id()).collect();
    assert_eq!(txs, vec!["tx-a", "tx-a", "tx-b"]);
}

#[test]
fn test_decode_is_deterministic() {
    let bundle = bundle_of(
        100,
        vec![TxEvents::new(
            "tx-a",
            vec![
                log_record(0, CONTRACT, 5, 44),
                log_record(1, CONTRACT, 0, 48),
            ],
        )],
    );

    let first = decode_contract_logs(&bundle, CONTRACT);
    let second = decode_contract_logs(&bundle, CONTRACT);
    assert_eq!(first, second);
}

// ============================================================================
// LAST ENTRY WINS
// ============================================================================

#[test]
fn test_last_entry_wins_for_transaction() {
    let bundle = bundle_of(
        100,
        vec![TxEvents::new(
            "tx-a",
            vec![
                log_record(0, CONTRACT, 5, 48),
                log_record(1, CONTRACT, 8, 48),
                log_record(2, CONTRACT, 0, 48),
            ],
        )],
    );

    let outcome = tx_log_outcome(&bundle, CONTRACT, "tx-a");
    assert_eq!(outcome, TxLogOutcome::Resolved(LogType::Success));
    assert!(outcome.is_success());
}

#[test]
fn test_last_entry_failure_overrides_earlier_success() {
    let bundle = bundle_of(
        100,
        vec![TxEvents::new(
            "tx-a",
            vec![
                log_record(0, CONTRACT, 0, 48),
                log_record(1, CONTRACT, 10, 48),
            ],
        )],
    );

    let outcome = tx_log_outcome(&bundle, CONTRACT, "tx-a");
    assert_eq!(outcome, TxLogOutcome::Resolved(LogType::InsufficientFunds));
    assert!(!outcome.is_success());
}

#[test]
fn test_no_log_found_for_unrelated_transaction() {
    let bundle = bundle_of(
        100,
        vec![TxEvents::new("tx-a", vec![log_record(0, CONTRACT, 0, 48)])],
    );

    let outcome = tx_log_outcome(&bundle, CONTRACT, "tx-other");
    assert_eq!(outcome, TxLogOutcome::NoLogFound);
    assert!(!outcome.is_success());
}
