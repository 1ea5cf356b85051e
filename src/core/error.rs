// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for siicodec.
//!
//! Provides error types for SII PROM encode/decode operations:
//! - Missing or out-of-range descriptor fields
//! - String table capacity and index lookups
//! - Category framing and truncated images
//! - Header checksum and layout version validation

use std::fmt;

/// Errors that can occur while encoding or decoding an SII PROM image.
///
/// Encode either returns a complete byte sequence or one of these; decode
/// either returns a complete descriptor or one of these. No partial output
/// is ever produced.
#[derive(Debug, Clone)]
pub enum SiiError {
    /// A mandatory descriptor value is absent
    MissingMandatoryField {
        /// Field name (e.g. "vendor id")
        field: &'static str,
    },

    /// A numeric field does not fit its declared width
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Value that was supplied
        value: i64,
        /// Largest representable value
        max: i64,
    },

    /// PDO entry base data type code not in the fixed type table
    UnsupportedDataType {
        /// Type code read from the image
        code: u8,
    },

    /// More than 255 distinct strings, or a single string longer than 255 bytes
    StringTableOverflow {
        /// What overflowed
        reason: String,
    },

    /// A string index does not resolve against the string table
    InvalidStringIndex {
        /// 1-based index that was looked up
        index: u8,
        /// Number of strings in the table
        count: usize,
    },

    /// Fewer bytes remain than a field or category declares
    TruncatedProm {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Buffer offset when the error occurred
        offset: usize,
    },

    /// Header layout version word is not supported
    VersionMismatch {
        /// Supported layout version
        expected: u16,
        /// Version word read from the image
        found: u16,
    },

    /// Header CRC-8 does not match the config-data block
    ChecksumMismatch {
        /// CRC computed over the config-data block
        expected: u8,
        /// CRC byte stored in the image
        found: u8,
    },

    /// A category a caller demanded never appears before the terminator
    CategoryNotFound {
        /// Category id that was requested
        id: u16,
    },

    /// PDO entries sharing a nonzero index are not numbered 1..N contiguously
    NonContiguousSubIndex {
        /// PDO entry index whose subindex run is broken
        index: u16,
        /// Subindex that would continue the run
        expected: u8,
        /// Subindex actually found
        found: u8,
    },

    /// A count exceeds a protocol-fixed maximum
    TooManyEntries {
        /// What was counted
        what: &'static str,
        /// Count that was supplied
        count: usize,
        /// Protocol maximum
        max: usize,
    },
}

impl SiiError {
    /// Create a missing mandatory field error.
    pub fn missing_field(field: &'static str) -> Self {
        SiiError::MissingMandatoryField { field }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(field: &'static str, value: i64, max: i64) -> Self {
        SiiError::OutOfRange { field, value, max }
    }

    /// Create an unsupported data type error.
    pub fn unsupported_data_type(code: u8) -> Self {
        SiiError::UnsupportedDataType { code }
    }

    /// Create a string table overflow error.
    pub fn string_table_overflow(reason: impl Into<String>) -> Self {
        SiiError::StringTableOverflow {
            reason: reason.into(),
        }
    }

    /// Create an invalid string index error.
    pub fn invalid_string_index(index: u8, count: usize) -> Self {
        SiiError::InvalidStringIndex { index, count }
    }

    /// Create a truncated PROM error.
    pub fn truncated(requested: usize, available: usize, offset: usize) -> Self {
        SiiError::TruncatedProm {
            requested,
            available,
            offset,
        }
    }

    /// Create a layout version mismatch error.
    pub fn version_mismatch(expected: u16, found: u16) -> Self {
        SiiError::VersionMismatch { expected, found }
    }

    /// Create a header checksum mismatch error.
    pub fn checksum_mismatch(expected: u8, found: u8) -> Self {
        SiiError::ChecksumMismatch { expected, found }
    }

    /// Create a category not found error.
    pub fn category_not_found(id: u16) -> Self {
        SiiError::CategoryNotFound { id }
    }

    /// Create a too-many-entries error.
    pub fn too_many(what: &'static str, count: usize, max: usize) -> Self {
        SiiError::TooManyEntries { what, count, max }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            SiiError::MissingMandatoryField { field } => vec![("field", (*field).to_string())],
            SiiError::OutOfRange { field, value, max } => vec![
                ("field", (*field).to_string()),
                ("value", value.to_string()),
                ("max", max.to_string()),
            ],
            SiiError::UnsupportedDataType { code } => {
                vec![("code", format!("0x{code:02X}"))]
            }
            SiiError::StringTableOverflow { reason } => vec![("reason", reason.clone())],
            SiiError::InvalidStringIndex { index, count } => vec![
                ("index", index.to_string()),
                ("count", count.to_string()),
            ],
            SiiError::TruncatedProm {
                requested,
                available,
                offset,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("offset", offset.to_string()),
            ],
            SiiError::VersionMismatch { expected, found } => vec![
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            SiiError::ChecksumMismatch { expected, found } => vec![
                ("expected", format!("0x{expected:02X}")),
                ("found", format!("0x{found:02X}")),
            ],
            SiiError::CategoryNotFound { id } => vec![("id", format!("0x{id:04X}"))],
            SiiError::NonContiguousSubIndex {
                index,
                expected,
                found,
            } => vec![
                ("index", format!("0x{index:04X}")),
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            SiiError::TooManyEntries { what, count, max } => vec![
                ("what", (*what).to_string()),
                ("count", count.to_string()),
                ("max", max.to_string()),
            ],
        }
    }
}

impl fmt::Display for SiiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiiError::MissingMandatoryField { field } => {
                write!(f, "Mandatory field '{field}' is missing")
            }
            SiiError::OutOfRange { field, value, max } => {
                write!(f, "Field '{field}' value {value} exceeds maximum {max}")
            }
            SiiError::UnsupportedDataType { code } => {
                write!(
                    f,
                    "Data type code 0x{code:02X} is not a recognized base data type"
                )
            }
            SiiError::StringTableOverflow { reason } => {
                write!(f, "String table overflow: {reason}")
            }
            SiiError::InvalidStringIndex { index, count } => {
                write!(
                    f,
                    "String index {index} does not resolve (table holds {count} strings)"
                )
            }
            SiiError::TruncatedProm {
                requested,
                available,
                offset,
            } => write!(
                f,
                "Truncated PROM: requested {requested} bytes at offset {offset}, but only {available} bytes available"
            ),
            SiiError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Unsupported PROM layout version {found} (supported: {expected})"
                )
            }
            SiiError::ChecksumMismatch { expected, found } => write!(
                f,
                "Header CRC mismatch: computed 0x{expected:02X}, image contains 0x{found:02X}"
            ),
            SiiError::CategoryNotFound { id } => {
                write!(f, "Category 0x{id:04X} not found before terminator")
            }
            SiiError::NonContiguousSubIndex {
                index,
                expected,
                found,
            } => write!(
                f,
                "PDO entries for index 0x{index:04X} are not contiguous: expected subindex {expected}, found {found}"
            ),
            SiiError::TooManyEntries { what, count, max } => {
                write!(f, "Too many {what}: {count} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for SiiError {}

/// Result type for siicodec operations.
pub type Result<T> = std::result::Result<T, SiiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let err = SiiError::missing_field("vendor id");
        assert!(matches!(err, SiiError::MissingMandatoryField { .. }));
        assert_eq!(err.to_string(), "Mandatory field 'vendor id' is missing");
    }

    #[test]
    fn test_out_of_range() {
        let err = SiiError::out_of_range("eeprom size word", 70000, 65535);
        assert!(matches!(err, SiiError::OutOfRange { .. }));
        assert_eq!(
            err.to_string(),
            "Field 'eeprom size word' value 70000 exceeds maximum 65535"
        );
    }

    #[test]
    fn test_unsupported_data_type() {
        let err = SiiError::unsupported_data_type(0x77);
        assert_eq!(
            err.to_string(),
            "Data type code 0x77 is not a recognized base data type"
        );
    }

    #[test]
    fn test_string_table_overflow() {
        let err = SiiError::string_table_overflow("more than 255 strings");
        assert_eq!(
            err.to_string(),
            "String table overflow: more than 255 strings"
        );
    }

    #[test]
    fn test_invalid_string_index() {
        let err = SiiError::invalid_string_index(9, 3);
        assert_eq!(
            err.to_string(),
            "String index 9 does not resolve (table holds 3 strings)"
        );
    }

    #[test]
    fn test_truncated() {
        let err = SiiError::truncated(4, 2, 130);
        assert_eq!(
            err.to_string(),
            "Truncated PROM: requested 4 bytes at offset 130, but only 2 bytes available"
        );
    }

    #[test]
    fn test_version_mismatch() {
        let err = SiiError::version_mismatch(1, 2);
        assert_eq!(
            err.to_string(),
            "Unsupported PROM layout version 2 (supported: 1)"
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let err = SiiError::checksum_mismatch(0x2B, 0x00);
        assert_eq!(
            err.to_string(),
            "Header CRC mismatch: computed 0x2B, image contains 0x00"
        );
    }

    #[test]
    fn test_category_not_found() {
        let err = SiiError::category_not_found(30);
        assert_eq!(
            err.to_string(),
            "Category 0x001E not found before terminator"
        );
    }

    #[test]
    fn test_non_contiguous_sub_index() {
        let err = SiiError::NonContiguousSubIndex {
            index: 0x1100,
            expected: 3,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "PDO entries for index 0x1100 are not contiguous: expected subindex 3, found 4"
        );
    }

    #[test]
    fn test_too_many_entries() {
        let err = SiiError::too_many("PDO entries", 300, 255);
        assert_eq!(
            err.to_string(),
            "Too many PDO entries: 300 exceeds maximum 255"
        );
    }

    #[test]
    fn test_log_fields_truncated() {
        let err = SiiError::truncated(4, 2, 130);
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ("requested", "4".to_string()));
        assert_eq!(fields[1], ("available", "2".to_string()));
        assert_eq!(fields[2], ("offset", "130".to_string()));
    }

    #[test]
    fn test_log_fields_checksum() {
        let err = SiiError::checksum_mismatch(0x2B, 0x00);
        let fields = err.log_fields();
        assert_eq!(fields[0], ("expected", "0x2B".to_string()));
        assert_eq!(fields[1], ("found", "0x00".to_string()));
    }

    #[test]
    fn test_error_debug_format() {
        let err = SiiError::missing_field("vendor id");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("MissingMandatoryField"));
    }

    #[test]
    fn test_error_clone() {
        let err1 = SiiError::missing_field("vendor id");
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}
