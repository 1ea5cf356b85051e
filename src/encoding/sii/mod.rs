// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SII PROM image codec.
//!
//! Image layout (all multi-byte values little-endian):
//! - Fixed 128-byte header: config data + CRC, identity words, bootstrap
//!   block, mailbox words, size and layout version words
//! - Category stream: TLV frames (see [`cursor`]) up to the `0xFFFF`
//!   terminator
//!
//! Standard category ids are the `CAT_*` constants below; ids 1..=9 and
//! 0x0800..=0xFFFE are device/vendor-specific and passed through opaquely.

pub mod crc;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod strings;

pub use cursor::{write_category, Cat, CatWalk, CAT_END};
pub use decoder::{decode, PromDecoder};
pub use encoder::{encode, PromEncoder};
pub use strings::StringTable;

/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 128;

/// Supported layout version (header word at offset 126).
pub const LAYOUT_VERSION: u16 = 0x0001;

/// Seed of the header CRC-8.
pub const CRC_SEED: u8 = 0xFF;

/// On-wire length of the config-data block at offset 0.
pub const CONFIG_DATA_LEN: usize = 14;

/// On-wire length of the bootstrap mailbox block at offset 40.
pub const BOOTSTRAP_LEN: usize = 8;

/// Wire length of the General category payload.
pub const GENERAL_PAYLOAD_LEN: usize = 32;

/// Maximum number of FMMU usage entries.
pub const MAX_FMMUS: usize = 4;

/// String table category.
pub const CAT_STRINGS: u16 = 10;
/// General device information category.
pub const CAT_GENERAL: u16 = 30;
/// FMMU usage category.
pub const CAT_FMMU: u16 = 40;
/// Sync-manager records category.
pub const CAT_SYNC_MANAGER: u16 = 41;
/// TxPDO (slave-to-master) category.
pub const CAT_TXPDO: u16 = 50;
/// RxPDO (master-to-slave) category.
pub const CAT_RXPDO: u16 = 51;

/// True for ids reserved for device/vendor-specific categories.
#[must_use]
pub fn is_vendor_category(id: u16) -> bool {
    matches!(id, 1..=9 | 0x0800..=0xFFFE)
}
