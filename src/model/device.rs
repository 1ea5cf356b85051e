// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Typed slave device descriptor.
//!
//! A [`DeviceDescriptor`] is the in-memory form of an EtherCAT slave
//! device description, populated by the XML-import collaborator (or built
//! programmatically) before encoding, and produced fresh by decoding. The
//! codec never mutates a descriptor it encodes.

use crate::model::pdo::PdoDescriptor;

/// Mailbox protocol bitmap, as stored in the header word at offset 56.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailboxProtocols(u16);

impl MailboxProtocols {
    /// ADS over EtherCAT
    pub const AOE: MailboxProtocols = MailboxProtocols(0x01);
    /// Ethernet over EtherCAT
    pub const EOE: MailboxProtocols = MailboxProtocols(0x02);
    /// CAN application protocol over EtherCAT
    pub const COE: MailboxProtocols = MailboxProtocols(0x04);
    /// File access over EtherCAT
    pub const FOE: MailboxProtocols = MailboxProtocols(0x08);
    /// Servo drive profile over EtherCAT
    pub const SOE: MailboxProtocols = MailboxProtocols(0x10);
    /// Vendor specific protocol over EtherCAT
    pub const VOE: MailboxProtocols = MailboxProtocols(0x20);

    /// Create an empty protocol set.
    #[must_use]
    pub const fn empty() -> Self {
        MailboxProtocols(0)
    }

    /// Create from a raw bitmap word.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        MailboxProtocols(bits)
    }

    /// Raw bitmap word.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if no protocol is declared.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if all protocols in `other` are declared.
    #[must_use]
    pub const fn contains(self, other: MailboxProtocols) -> bool {
        self.0 & other.0 == other.0
    }

    /// Add the protocols in `other`.
    pub fn insert(&mut self, other: MailboxProtocols) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for MailboxProtocols {
    type Output = MailboxProtocols;

    fn bitor(self, rhs: MailboxProtocols) -> MailboxProtocols {
        MailboxProtocols(self.0 | rhs.0)
    }
}

/// CoE sub-capability flags, stored in the first mailbox byte of the
/// General category (bit 0 is "CoE present" and derived from the
/// protocol bitmap, not from this struct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoeDetails {
    /// SDO information service (bit 1)
    pub sdo_info: bool,
    /// PDO assignment is configurable (bit 2)
    pub pdo_assign: bool,
    /// PDO mapping is configurable (bit 3)
    pub pdo_config: bool,
    /// PDO upload supported (bit 4)
    pub pdo_upload: bool,
    /// SDO complete access supported (bit 5)
    pub complete_access: bool,
}

impl CoeDetails {
    /// Detail bits (excluding the "CoE present" bit 0).
    #[must_use]
    pub fn detail_bits(self) -> u8 {
        let mut v = 0u8;
        if self.sdo_info {
            v |= 0x02;
        }
        if self.pdo_assign {
            v |= 0x04;
        }
        if self.pdo_config {
            v |= 0x08;
        }
        if self.pdo_upload {
            v |= 0x10;
        }
        if self.complete_access {
            v |= 0x20;
        }
        v
    }

    /// Rebuild from the General category mailbox byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            sdo_info: byte & 0x02 != 0,
            pdo_assign: byte & 0x04 != 0,
            pdo_config: byte & 0x08 != 0,
            pdo_upload: byte & 0x10 != 0,
            complete_access: byte & 0x20 != 0,
        }
    }
}

/// Mailbox sync-manager slot (start address and default size), used as a
/// fallback for the header words at offsets 48/52 when no matching
/// [`SyncManager`] record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxSlot {
    /// Physical start address
    pub start: u16,
    /// Default buffer size in bytes
    pub size: u16,
}

/// Mailbox configuration of a slave.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MailboxConfig {
    /// Declared mailbox protocols
    pub protocols: MailboxProtocols,
    /// CoE sub-capabilities (meaningful when CoE is declared)
    pub coe_details: CoeDetails,
    /// Mailbox data link layer flag (General category behavior bit 2)
    pub data_link_layer: bool,
    /// Fallback mailbox-out slot when no MBoxOut sync manager exists
    pub out_slot: Option<MailboxSlot>,
    /// Fallback mailbox-in slot when no MBoxIn sync manager exists
    pub in_slot: Option<MailboxSlot>,
}

/// Device behavior flags stored in the General category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BehaviorFlags {
    /// Transition to SAFEOP on start without sync (bit 0)
    pub start_to_saveop_no_sync: bool,
    /// Use LRD/LWR instead of LRW (bit 1)
    pub use_lrd_lwr: bool,
    /// Identification register 134 in use (bit 3)
    pub identification_reg134: bool,
}

/// What a sync manager is used for. The discriminants are the type codes
/// of the SyncManager category (41).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SmPurpose {
    /// Not attributed
    Unknown = 0,
    /// Write mailbox (master to slave)
    MBoxOut = 1,
    /// Read mailbox (slave to master)
    MBoxIn = 2,
    /// Output process data
    Outputs = 3,
    /// Input process data
    Inputs = 4,
}

impl SmPurpose {
    /// Decode a category-41 type code.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => SmPurpose::MBoxOut,
            2 => SmPurpose::MBoxIn,
            3 => SmPurpose::Outputs,
            4 => SmPurpose::Inputs,
            _ => SmPurpose::Unknown,
        }
    }
}

/// One sync-manager record (category 41, 8 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncManager {
    /// Physical start address
    pub start: u16,
    /// Default buffer size in bytes
    pub size: u16,
    /// Control register byte
    pub control: u8,
    /// Enable byte (nonzero = enabled)
    pub enable: u8,
    /// Purpose tag
    pub purpose: SmPurpose,
}

/// FMMU usage codes (category 40, one byte each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FmmuUsage {
    /// Not attributed
    Unused = 0,
    /// Maps output process data
    Outputs = 1,
    /// Maps input process data
    Inputs = 2,
    /// Maps the mailbox state bit
    MBoxState = 3,
}

impl FmmuUsage {
    /// Decode a category-40 usage byte.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => FmmuUsage::Outputs,
            2 => FmmuUsage::Inputs,
            3 => FmmuUsage::MBoxState,
            _ => FmmuUsage::Unused,
        }
    }
}

/// Opaque device/vendor-specific category, passed through the codec
/// verbatim. Valid ids are 1..=9 and 0x0800..=0xFFFE; standard ids are
/// rejected at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCategory {
    /// Category id
    pub id: u16,
    /// Raw payload bytes. Odd-length payloads gain a zero pad byte on
    /// the wire; decoding returns the padded (even-length) form, since
    /// the frame cannot tell data from pad.
    pub data: Vec<u8>,
}

/// A complete slave device descriptor, the unit of work of the codec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceDescriptor {
    /// Vendor id (mandatory for encoding)
    pub vendor_id: Option<u32>,
    /// Product code (0 when absent)
    pub product_code: u32,
    /// Revision number (0 when absent)
    pub revision_no: u32,
    /// Serial number (0 when absent)
    pub serial_no: u32,
    /// Raw hardware config-data block; at most 14 bytes, zero-padded on
    /// the wire and protected by the header CRC
    pub config_data: Vec<u8>,
    /// Bootstrap mailbox block; at most 8 bytes, zero-padded on the wire
    pub bootstrap: Option<Vec<u8>>,
    /// Mailbox configuration; `None` encodes an all-zero mailbox region
    pub mailbox: Option<MailboxConfig>,
    /// Total EEPROM size in bytes (encoded as `size * 8 / 1024 - 1`)
    pub eeprom_byte_size: u32,
    /// Device group type string
    pub group_type: String,
    /// Device type string
    pub device_type: String,
    /// Device name string
    pub name: String,
    /// Port physics codes, one char per port, up to 4 ('Y', 'H', 'K')
    pub physics: String,
    /// Behavior flags
    pub behavior: BehaviorFlags,
    /// EBus current in mA
    pub ebus_current: u16,
    /// Identification ADO; `Some` also sets behavior bit 4 on the wire
    pub identification_ado: Option<u16>,
    /// FMMU usage list, up to 4 on the wire
    pub fmmus: Vec<FmmuUsage>,
    /// Sync-manager records
    pub sync_managers: Vec<SyncManager>,
    /// Slave-to-master PDO (category 50)
    pub tx_pdo: Option<PdoDescriptor>,
    /// Master-to-slave PDO (category 51)
    pub rx_pdo: Option<PdoDescriptor>,
    /// Opaque vendor categories, emitted ahead of the standard ones
    pub vendor_categories: Vec<VendorCategory>,
}

impl DeviceDescriptor {
    /// Find the first sync manager with the given purpose.
    #[must_use]
    pub fn find_sm(&self, purpose: SmPurpose) -> Option<&SyncManager> {
        self.sync_managers.iter().find(|sm| sm.purpose == purpose)
    }
}
