// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Siicodec
//!
//! EtherCAT Slave Information Interface (SII) EEPROM image codec.
//!
//! This library converts between a typed [`DeviceDescriptor`] and the binary
//! PROM image an EtherCAT slave serves over its EEPROM interface:
//! - **Encoding** in [`encoding::sii::encoder`](crate::encoding::sii::encoder) -
//!   descriptor to complete image
//! - **Decoding** in [`encoding::sii::decoder`](crate::encoding::sii::decoder) -
//!   image back to a descriptor plus its string table
//! - **Device model** in [`model`](crate::model) - descriptors for PDOs,
//!   sync managers, FMMUs and mailbox configuration
//!
//! ## Architecture
//!
//! The library is organized by concern:
//! - `core/` - Error types shared by all operations
//! - `model/` - The typed device descriptor hierarchy
//! - `encoding/sii/` - Image layout: header, CRC, category framing,
//!   string table, encoder and decoder
//!
//! ## Example: Encoding a device
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use siicodec::{encode, decode, DeviceDescriptor};
//!
//! let device = DeviceDescriptor {
//!     vendor_id: Some(0x0050_5349),
//!     name: "Event receiver".to_string(),
//!     eeprom_byte_size: 2048,
//!     ..DeviceDescriptor::default()
//! };
//!
//! let prom = encode(&device)?;
//! let (roundtripped, _strings) = decode(&prom)?;
//! assert_eq!(roundtripped.name, "Event receiver");
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{Result, SiiError};

// Device data model
pub mod model;

pub use model::{
    BaseType, BehaviorFlags, CoeDetails, DeviceDescriptor, FmmuUsage, MailboxConfig,
    MailboxProtocols, MailboxSlot, PdoDescriptor, PdoEntry, PdoKind, SmPurpose, SyncManager,
    VendorCategory,
};

// Encoding/decoding
pub mod encoding;

pub use encoding::sii::{decode, encode, PromDecoder, PromEncoder, StringTable};
