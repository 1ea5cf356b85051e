// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Process Data Object descriptors.
//!
//! A PDO carries an ordered list of entries, each referencing a CoE object
//! (index/subindex), a display name and a base data type. The codec stores
//! RxPDOs in category 51 and TxPDOs in category 50 of the PROM image.

use crate::core::{Result, SiiError};

/// Base data types recognized in PDO entries.
///
/// The discriminants are the on-wire type codes of the SII PDO entry
/// record. The set is fixed by the EtherCAT slave information
/// specification; anything else fails decoding with
/// [`SiiError::UnsupportedDataType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BaseType {
    /// BOOL / BOOLEAN / BIT
    Bool = 0x01,
    /// SINT / INTEGER8
    Sint = 0x02,
    /// INT / INTEGER16
    Int = 0x03,
    /// DINT / INTEGER32
    Dint = 0x04,
    /// USINT / UNSIGNED8
    Usint = 0x05,
    /// UINT / UNSIGNED16
    Uint = 0x06,
    /// UDINT / UNSIGNED32
    Udint = 0x07,
    /// REAL / REAL32
    Real32 = 0x08,
    /// INT24 / INTEGER24
    Int24 = 0x10,
    /// LREAL / REAL64
    Real64 = 0x11,
    /// INT40 / INTEGER40
    Int40 = 0x12,
    /// INT48 / INTEGER48
    Int48 = 0x13,
    /// INT56 / INTEGER56
    Int56 = 0x14,
    /// LINT / INTEGER64
    Lint = 0x15,
    /// UINT24 / UNSIGNED24
    Uint24 = 0x16,
    /// UINT40 / UNSIGNED40
    Uint40 = 0x18,
    /// UINT48 / UNSIGNED48
    Uint48 = 0x19,
    /// UINT56 / UNSIGNED56
    Uint56 = 0x1A,
    /// ULINT / UNSIGNED64
    Ulint = 0x1B,
    /// GUID
    Guid = 0x1D,
    /// BYTE
    Byte = 0x1E,
    /// WORD
    Word = 0x1F,
    /// DWORD
    Dword = 0x20,
    /// BITARR8
    BitArr8 = 0x2D,
    /// BITARR16
    BitArr16 = 0x2E,
    /// BITARR32
    BitArr32 = 0x2F,
    /// BIT1
    Bit1 = 0x30,
    /// BIT2
    Bit2 = 0x31,
    /// BIT3
    Bit3 = 0x32,
    /// BIT4
    Bit4 = 0x33,
    /// BIT5
    Bit5 = 0x34,
    /// BIT6
    Bit6 = 0x35,
    /// BIT7
    Bit7 = 0x36,
    /// BIT8
    Bit8 = 0x37,
}

impl BaseType {
    /// On-wire type code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a type by its on-wire code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        use BaseType::*;
        Some(match code {
            0x01 => Bool,
            0x02 => Sint,
            0x03 => Int,
            0x04 => Dint,
            0x05 => Usint,
            0x06 => Uint,
            0x07 => Udint,
            0x08 => Real32,
            0x10 => Int24,
            0x11 => Real64,
            0x12 => Int40,
            0x13 => Int48,
            0x14 => Int56,
            0x15 => Lint,
            0x16 => Uint24,
            0x18 => Uint40,
            0x19 => Uint48,
            0x1A => Uint56,
            0x1B => Ulint,
            0x1D => Guid,
            0x1E => Byte,
            0x1F => Word,
            0x20 => Dword,
            0x2D => BitArr8,
            0x2E => BitArr16,
            0x2F => BitArr32,
            0x30 => Bit1,
            0x31 => Bit2,
            0x32 => Bit3,
            0x33 => Bit4,
            0x34 => Bit5,
            0x35 => Bit6,
            0x36 => Bit7,
            0x37 => Bit8,
            _ => return None,
        })
    }

    /// Look up a type by an ESI name, accepting the spelling aliases used
    /// in device description files (e.g. "UNSIGNED32" for UDINT).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        use BaseType::*;
        Some(match name {
            "BOOLEAN" | "BOOL" | "BIT" => Bool,
            "INTEGER8" | "SINT" => Sint,
            "INTEGER16" | "INT" => Int,
            "INTEGER24" | "INT24" => Int24,
            "INTEGER32" | "DINT" => Dint,
            "INTEGER40" | "INT40" => Int40,
            "INTEGER48" | "INT48" => Int48,
            "INTEGER56" | "INT56" => Int56,
            "INTEGER64" | "LINT" => Lint,
            "UNSIGNED8" | "USINT" => Usint,
            "UNSIGNED16" | "UINT" => Uint,
            "UNSIGNED24" | "UINT24" => Uint24,
            "UNSIGNED32" | "UDINT" => Udint,
            "UNSIGNED40" | "UINT40" => Uint40,
            "UNSIGNED48" | "UINT48" => Uint48,
            "UNSIGNED56" | "UINT56" => Uint56,
            "UNSIGNED64" | "ULINT" => Ulint,
            "REAL32" | "REAL" => Real32,
            "REAL64" | "LREAL" => Real64,
            "GUID" => Guid,
            "BYTE" => Byte,
            "WORD" => Word,
            "DWORD" => Dword,
            "BITARR8" => BitArr8,
            "BITARR16" => BitArr16,
            "BITARR32" => BitArr32,
            "BIT1" => Bit1,
            "BIT2" => Bit2,
            "BIT3" => Bit3,
            "BIT4" => Bit4,
            "BIT5" => Bit5,
            "BIT6" => Bit6,
            "BIT7" => Bit7,
            "BIT8" => Bit8,
            _ => return None,
        })
    }

    /// Canonical ESI name of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        use BaseType::*;
        match self {
            Bool => "BOOL",
            Sint => "SINT",
            Int => "INT",
            Dint => "DINT",
            Usint => "USINT",
            Uint => "UINT",
            Udint => "UDINT",
            Real32 => "REAL32",
            Int24 => "INT24",
            Real64 => "REAL64",
            Int40 => "INT40",
            Int48 => "INT48",
            Int56 => "INT56",
            Lint => "LINT",
            Uint24 => "UINT24",
            Uint40 => "UINT40",
            Uint48 => "UINT48",
            Uint56 => "UINT56",
            Ulint => "ULINT",
            Guid => "GUID",
            Byte => "BYTE",
            Word => "WORD",
            Dword => "DWORD",
            BitArr8 => "BITARR8",
            BitArr16 => "BITARR16",
            BitArr32 => "BITARR32",
            Bit1 => "BIT1",
            Bit2 => "BIT2",
            Bit3 => "BIT3",
            Bit4 => "BIT4",
            Bit5 => "BIT5",
            Bit6 => "BIT6",
            Bit7 => "BIT7",
            Bit8 => "BIT8",
        }
    }
}

/// Direction of a PDO, as seen from the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdoKind {
    /// Slave-to-master process data (category 50)
    Tx,
    /// Master-to-slave process data (category 51)
    Rx,
}

impl PdoKind {
    /// Default sync-manager number used on the wire when the descriptor
    /// does not assign one (3 for TxPDO, 2 for RxPDO).
    #[must_use]
    pub const fn default_sm(self) -> u8 {
        match self {
            PdoKind::Tx => 3,
            PdoKind::Rx => 2,
        }
    }
}

/// One entry of a PDO.
///
/// An entry with `index == 0` is a structural padding placeholder: it
/// carries no subindex, name or meaningful type and only reserves
/// `bit_len` bits of process data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdoEntry {
    /// CoE object index (0 = padding/no object)
    pub index: u16,
    /// 1-based subindex; mandatory when `index != 0`
    pub sub_index: Option<u8>,
    /// Display name (empty = no string table entry)
    pub name: String,
    /// Base data type
    pub data_type: BaseType,
    /// Entry width in bits (must be a multiple of 8)
    pub bit_len: u8,
}

impl PdoEntry {
    /// Create an entry for a real object.
    pub fn new(
        index: u16,
        sub_index: u8,
        name: impl Into<String>,
        data_type: BaseType,
        bit_len: u8,
    ) -> Self {
        Self {
            index,
            sub_index: Some(sub_index),
            name: name.into(),
            data_type,
            bit_len,
        }
    }

    /// Create a padding placeholder entry (`index == 0`).
    pub fn padding(bit_len: u8) -> Self {
        Self {
            index: 0,
            sub_index: None,
            name: String::new(),
            data_type: BaseType::Byte,
            bit_len,
        }
    }
}

/// A process data object with its entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PdoDescriptor {
    /// PDO index (e.g. 0x1600 for the first RxPDO)
    pub index: u16,
    /// Display name (empty = no string table entry)
    pub name: String,
    /// Assigned sync-manager number; `Some` also sets the "Sm present"
    /// flag bit on the wire
    pub sm: Option<u8>,
    /// Mandatory flag (wire bit 0x0001)
    pub mandatory: bool,
    /// Fixed-content flag (wire bit 0x0010)
    pub fixed: bool,
    /// Virtual flag (wire bit 0x0020)
    pub virtual_: bool,
    /// Entries in process-image order
    pub entries: Vec<PdoEntry>,
}

impl PdoDescriptor {
    /// Create an empty PDO with the given index and name.
    pub fn new(index: u16, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate structural invariants ahead of encoding:
    /// - at most 255 entries
    /// - every nonzero-index entry carries a subindex
    /// - entries sharing a nonzero index are contiguous and numbered 1..N
    ///   (a lone entry may carry any subindex)
    /// - bit lengths are multiples of 8
    pub fn validate(&self) -> Result<()> {
        if self.entries.len() > 255 {
            return Err(SiiError::too_many("PDO entries", self.entries.len(), 255));
        }
        let mut run_index = 0u16;
        let mut run_sub = 0u8;
        let mut run_start = 0u8;
        let mut seen: Vec<u16> = Vec::new();
        for ent in &self.entries {
            if ent.bit_len % 8 != 0 {
                return Err(SiiError::out_of_range(
                    "PDO entry bit length (must be a multiple of 8)",
                    i64::from(ent.bit_len),
                    i64::from(ent.bit_len / 8 * 8),
                ));
            }
            if ent.index == 0 {
                run_index = 0;
                continue;
            }
            let sub = ent
                .sub_index
                .ok_or_else(|| SiiError::missing_field("PDO entry subindex"))?;
            if ent.index == run_index {
                // a multi-entry run must cover 1..N
                if run_start != 1 {
                    return Err(SiiError::NonContiguousSubIndex {
                        index: ent.index,
                        expected: 1,
                        found: run_start,
                    });
                }
                if sub != run_sub + 1 {
                    return Err(SiiError::NonContiguousSubIndex {
                        index: ent.index,
                        expected: run_sub + 1,
                        found: sub,
                    });
                }
            } else {
                // a nonzero index may only start one run
                if seen.contains(&ent.index) {
                    return Err(SiiError::NonContiguousSubIndex {
                        index: ent.index,
                        expected: run_sub + 1,
                        found: sub,
                    });
                }
                seen.push(ent.index);
                run_start = sub;
            }
            run_index = ent.index;
            run_sub = sub;
        }
        Ok(())
    }
}
