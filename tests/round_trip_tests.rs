// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Round-trip integration tests.
//!
//! Tests cover:
//! - Encoding descriptors and decoding the resulting images back
//! - Semantic equality of the decoded descriptor
//! - Byte-exact idempotence of re-encoding a decoded descriptor
//! - The end-to-end event-receiver scenario with string deduplication

use siicodec::{
    decode, encode, BaseType, BehaviorFlags, CoeDetails, DeviceDescriptor, FmmuUsage,
    MailboxConfig, MailboxProtocols, PdoDescriptor, PdoEntry, SmPurpose, SyncManager,
    VendorCategory,
};

// ============================================================================
// Test Fixtures
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Event-receiver device: one RxPDO driving LEDs, one TxPDO publishing a
/// 64-bit timestamp split into two UDINT entries.
fn event_receiver() -> DeviceDescriptor {
    let mut dev = DeviceDescriptor {
        vendor_id: Some(0x0050_5349),
        product_code: 0x0000_0001,
        revision_no: 0x0000_0002,
        eeprom_byte_size: 2048,
        group_type: "EVR".to_string(),
        device_type: "EVR".to_string(),
        name: "Event receiver".to_string(),
        physics: "YY".to_string(),
        ..DeviceDescriptor::default()
    };

    let mut tx = PdoDescriptor::new(0x1A00, "");
    tx.entries = vec![
        PdoEntry::new(0x6000, 1, "TimestampHi", BaseType::Udint, 32),
        PdoEntry::new(0x6000, 2, "TimestampLo", BaseType::Udint, 32),
    ];
    dev.tx_pdo = Some(tx);

    let mut rx = PdoDescriptor::new(0x1600, "");
    rx.entries = vec![PdoEntry::new(0x7000, 1, "LED", BaseType::Byte, 24)];
    dev.rx_pdo = Some(rx);
    dev
}

/// A device exercising every optional field at once.
fn full_featured_device() -> DeviceDescriptor {
    let mut dev = event_receiver();
    dev.serial_no = 0xCAFE_BABE;
    dev.config_data = hex::decode("910201440000000000000040").unwrap();
    dev.bootstrap = Some(vec![0x00, 0x10, 0x80, 0x00, 0x80, 0x10, 0x80, 0x00]);
    dev.ebus_current = 250;
    dev.identification_ado = Some(0x0134);
    dev.behavior = BehaviorFlags {
        start_to_saveop_no_sync: true,
        use_lrd_lwr: false,
        identification_reg134: true,
    };
    dev.mailbox = Some(MailboxConfig {
        protocols: MailboxProtocols::COE | MailboxProtocols::FOE,
        coe_details: CoeDetails {
            sdo_info: true,
            pdo_assign: true,
            ..CoeDetails::default()
        },
        data_link_layer: true,
        out_slot: None,
        in_slot: None,
    });
    dev.fmmus = vec![FmmuUsage::Outputs, FmmuUsage::Inputs, FmmuUsage::MBoxState];
    dev.sync_managers = vec![
        SyncManager {
            start: 0x1000,
            size: 0x80,
            control: 0x26,
            enable: 1,
            purpose: SmPurpose::MBoxOut,
        },
        SyncManager {
            start: 0x1080,
            size: 0x80,
            control: 0x22,
            enable: 1,
            purpose: SmPurpose::MBoxIn,
        },
        SyncManager {
            start: 0x1100,
            size: 0x03,
            control: 0x24,
            enable: 1,
            purpose: SmPurpose::Outputs,
        },
        SyncManager {
            start: 0x1180,
            size: 0x08,
            control: 0x20,
            enable: 1,
            purpose: SmPurpose::Inputs,
        },
    ];
    dev.vendor_categories = vec![VendorCategory {
        id: 0x0920,
        data: vec![0x01, 0x02, 0x03, 0x04],
    }];
    dev
}

// ============================================================================
// End-to-End Scenario
// ============================================================================

#[test]
fn test_event_receiver_scenario() {
    init_tracing();
    let dev = event_receiver();
    let prom = encode(&dev).unwrap();
    let (decoded, strings) = decode(&prom).unwrap();

    assert_eq!(decoded.vendor_id, Some(0x0050_5349));

    let tx = decoded.tx_pdo.as_ref().expect("TxPDO");
    assert_eq!(tx.index, 0x1A00);
    assert_eq!(tx.entries.len(), 2);
    assert_eq!(tx.entries[0].name, "TimestampHi");
    assert_eq!(tx.entries[1].name, "TimestampLo");
    assert_eq!(tx.entries[0].bit_len, 32);
    assert_eq!(tx.entries[1].bit_len, 32);
    assert_eq!(tx.entries[0].data_type, BaseType::Udint);

    let rx = decoded.rx_pdo.as_ref().expect("RxPDO");
    assert_eq!(rx.index, 0x1600);
    assert_eq!(rx.entries.len(), 1);
    assert_eq!(rx.entries[0].name, "LED");
    assert_eq!(rx.entries[0].bit_len, 24);
    assert_eq!(rx.entries[0].data_type, BaseType::Byte);

    // "EVR" is shared by group and device type; PDO names are empty
    let names: Vec<_> = strings.iter().collect();
    assert_eq!(
        names,
        vec!["EVR", "Event receiver", "TimestampHi", "TimestampLo", "LED"]
    );
}

// ============================================================================
// Round-Trip Properties
// ============================================================================

#[test]
fn test_round_trip_semantic_equality() {
    init_tracing();
    let dev = full_featured_device();
    let prom = encode(&dev).unwrap();
    let (decoded, _) = decode(&prom).unwrap();

    assert_eq!(decoded.vendor_id, dev.vendor_id);
    assert_eq!(decoded.product_code, dev.product_code);
    assert_eq!(decoded.revision_no, dev.revision_no);
    assert_eq!(decoded.serial_no, dev.serial_no);
    assert_eq!(decoded.bootstrap, dev.bootstrap);
    assert_eq!(decoded.eeprom_byte_size, dev.eeprom_byte_size);
    assert_eq!(decoded.group_type, dev.group_type);
    assert_eq!(decoded.device_type, dev.device_type);
    assert_eq!(decoded.name, dev.name);
    assert_eq!(decoded.physics, dev.physics);
    assert_eq!(decoded.behavior, dev.behavior);
    assert_eq!(decoded.ebus_current, dev.ebus_current);
    assert_eq!(decoded.identification_ado, dev.identification_ado);
    assert_eq!(decoded.mailbox, dev.mailbox);
    assert_eq!(decoded.fmmus, dev.fmmus);
    assert_eq!(decoded.sync_managers, dev.sync_managers);
    assert_eq!(decoded.tx_pdo, dev.tx_pdo);
    assert_eq!(decoded.rx_pdo, dev.rx_pdo);
    assert_eq!(decoded.vendor_categories, dev.vendor_categories);

    // config data comes back zero-padded to its wire length
    let mut padded = dev.config_data.clone();
    padded.resize(14, 0);
    assert_eq!(decoded.config_data, padded);
}

#[test]
fn test_round_trip_byte_exact_idempotence() {
    init_tracing();
    for dev in [event_receiver(), full_featured_device()] {
        let first = encode(&dev).unwrap();
        let (decoded, _) = decode(&first).unwrap();
        let second = encode(&decoded).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_minimal_device_round_trip() {
    init_tracing();
    let dev = DeviceDescriptor {
        vendor_id: Some(1),
        eeprom_byte_size: 128,
        ..DeviceDescriptor::default()
    };
    let prom = encode(&dev).unwrap();
    let (decoded, strings) = decode(&prom).unwrap();
    assert_eq!(decoded.vendor_id, Some(1));
    assert_eq!(decoded.eeprom_byte_size, 128);
    assert!(decoded.tx_pdo.is_none());
    assert!(decoded.rx_pdo.is_none());
    assert!(decoded.mailbox.is_none());
    assert!(strings.is_empty());

    let again = encode(&decoded).unwrap();
    assert_eq!(prom, again);
}

#[test]
fn test_image_grows_only_with_content() {
    let minimal = encode(&DeviceDescriptor {
        vendor_id: Some(1),
        eeprom_byte_size: 128,
        ..DeviceDescriptor::default()
    })
    .unwrap();
    let full = encode(&full_featured_device()).unwrap();
    assert!(minimal.len() < full.len());
    // header + empty strings/general/tx/rx categories + terminator
    assert_eq!(minimal.len(), 128 + (4 + 2) + (4 + 32) + 4 + 4 + 2);
}
