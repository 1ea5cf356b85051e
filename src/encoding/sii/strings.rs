// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PROM string table (category 10).
//!
//! All names in the image (group type, device type/name, PDO and entry
//! names) are stored once in category 10 and referenced elsewhere by a
//! 1-based 8-bit index; index 0 means "no string". A table lives only for
//! the duration of one encode or decode call and assigns indices strictly
//! in first-use order.

use std::collections::HashMap;

use crate::core::{Result, SiiError};
use crate::encoding::sii::cursor::Cat;

/// Hard protocol limit: indices are a single byte and 0 is reserved.
pub const MAX_STRINGS: usize = 255;

/// Hard protocol limit: each string is length-prefixed by a single byte.
pub const MAX_STRING_LEN: usize = 255;

/// Bidirectional string-to-index map with first-use ordering.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    /// Strings in insertion order; index i holds string with index i+1
    list: Vec<String>,
    /// Reverse map for deduplication during encoding
    map: HashMap<String, u8>,
}

impl StringTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of strings in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// True if the table holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Strings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(String::as_str)
    }

    /// Intern a string and return its 1-based index.
    ///
    /// Empty input returns 0 ("no string"). Duplicates collapse to the
    /// index assigned at first use.
    pub fn add_or_get(&mut self, s: &str) -> Result<u8> {
        if s.is_empty() {
            return Ok(0);
        }
        if let Some(&idx) = self.map.get(s) {
            return Ok(idx);
        }
        if s.len() > MAX_STRING_LEN {
            return Err(SiiError::string_table_overflow(format!(
                "string of {} bytes exceeds the {MAX_STRING_LEN}-byte limit",
                s.len()
            )));
        }
        if self.list.len() >= MAX_STRINGS {
            return Err(SiiError::string_table_overflow(format!(
                "more than {MAX_STRINGS} distinct strings"
            )));
        }
        self.list.push(s.to_string());
        let idx = self.list.len() as u8;
        self.map.insert(s.to_string(), idx);
        Ok(idx)
    }

    /// Resolve a 1-based index back to its string.
    pub fn resolve(&self, index: u8) -> Result<&str> {
        if index == 0 || usize::from(index) > self.list.len() {
            return Err(SiiError::invalid_string_index(index, self.list.len()));
        }
        Ok(&self.list[usize::from(index) - 1])
    }

    /// Resolve an index, mapping 0 to the empty string.
    ///
    /// Convenience for decoding fields where 0 legitimately means "no
    /// string"; any other unresolvable index is still an error.
    pub fn resolve_or_empty(&self, index: u8) -> Result<String> {
        if index == 0 {
            return Ok(String::new());
        }
        self.resolve(index).map(str::to_string)
    }

    /// Append the category-10 payload (count byte, then length-prefixed
    /// strings in insertion order). Word padding is the frame's business.
    pub fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.list.len() as u8);
        for s in &self.list {
            out.push(s.len() as u8);
            out.extend_from_slice(s.as_bytes());
        }
    }

    /// Rebuild a table from a category-10 payload.
    ///
    /// Strings are appended in image order without deduplication so that
    /// indices from other categories resolve exactly as written, even in
    /// hand-crafted images carrying duplicates.
    pub fn read_payload(cat: &mut Cat<'_>) -> Result<Self> {
        let count = cat.u8()?;
        let mut table = Self::new();
        for _ in 0..count {
            let len = cat.u8()?;
            let bytes = cat.bytes(usize::from(len))?;
            let s = String::from_utf8_lossy(bytes).into_owned();
            table.push(s);
        }
        Ok(table)
    }

    /// Append a string unconditionally (decode path; keeps duplicates).
    fn push(&mut self, s: String) {
        self.list.push(s.clone());
        let idx = self.list.len() as u8;
        // first occurrence wins so re-encoding reuses the lowest index
        self.map.entry(s).or_insert(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::sii::cursor::write_category;

    #[test]
    fn test_empty_string_is_index_zero() {
        let mut table = StringTable::new();
        assert_eq!(table.add_or_get("").unwrap(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_first_use_ordering() {
        let mut table = StringTable::new();
        assert_eq!(table.add_or_get("alpha").unwrap(), 1);
        assert_eq!(table.add_or_get("beta").unwrap(), 2);
        assert_eq!(table.add_or_get("gamma").unwrap(), 3);
        let strings: Vec<_> = table.iter().collect();
        assert_eq!(strings, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut table = StringTable::new();
        assert_eq!(table.add_or_get("Foo").unwrap(), 1);
        assert_eq!(table.add_or_get("Bar").unwrap(), 2);
        assert_eq!(table.add_or_get("Foo").unwrap(), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_256th_string_overflows() {
        let mut table = StringTable::new();
        for i in 0..255 {
            table.add_or_get(&format!("s{i}")).unwrap();
        }
        assert_eq!(table.len(), 255);
        let err = table.add_or_get("one too many").unwrap_err();
        assert!(matches!(err, SiiError::StringTableOverflow { .. }));
    }

    #[test]
    fn test_overlong_string_overflows() {
        let mut table = StringTable::new();
        let long = "x".repeat(256);
        assert!(matches!(
            table.add_or_get(&long).unwrap_err(),
            SiiError::StringTableOverflow { .. }
        ));
        // 255 bytes is still fine
        let ok = "x".repeat(255);
        assert_eq!(table.add_or_get(&ok).unwrap(), 1);
    }

    #[test]
    fn test_resolve() {
        let mut table = StringTable::new();
        table.add_or_get("alpha").unwrap();
        table.add_or_get("beta").unwrap();
        assert_eq!(table.resolve(1).unwrap(), "alpha");
        assert_eq!(table.resolve(2).unwrap(), "beta");
        assert!(matches!(
            table.resolve(0).unwrap_err(),
            SiiError::InvalidStringIndex { .. }
        ));
        assert!(matches!(
            table.resolve(3).unwrap_err(),
            SiiError::InvalidStringIndex { .. }
        ));
    }

    #[test]
    fn test_resolve_or_empty() {
        let mut table = StringTable::new();
        table.add_or_get("alpha").unwrap();
        assert_eq!(table.resolve_or_empty(0).unwrap(), "");
        assert_eq!(table.resolve_or_empty(1).unwrap(), "alpha");
        assert!(table.resolve_or_empty(2).is_err());
    }

    #[test]
    fn test_payload_round_trip() {
        let mut table = StringTable::new();
        table.add_or_get("EVR").unwrap();
        table.add_or_get("TimestampHi").unwrap();

        let mut buf = Vec::new();
        write_category(&mut buf, 10, |out| {
            table.write_payload(out);
            Ok(())
        })
        .unwrap();

        let mut cat = Cat::seek(&buf, 0, 10).unwrap().expect("category present");
        let decoded = StringTable::read_payload(&mut cat).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.resolve(1).unwrap(), "EVR");
        assert_eq!(decoded.resolve(2).unwrap(), "TimestampHi");
    }

    #[test]
    fn test_payload_truncated() {
        // second length byte claims more bytes than the payload holds
        let mut buf = Vec::new();
        write_category(&mut buf, 10, |out| {
            out.push(2);
            out.push(3);
            out.extend_from_slice(b"abc");
            out.push(5);
            Ok(())
        })
        .unwrap();
        let mut cat = Cat::seek(&buf, 0, 10).unwrap().expect("category present");
        assert!(matches!(
            StringTable::read_payload(&mut cat).unwrap_err(),
            SiiError::TruncatedProm { .. }
        ));
    }
}
