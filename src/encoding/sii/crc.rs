// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CRC-8 checksum over the fixed PROM header region.
//!
//! The SII header stores a CRC-8 (polynomial 0x07, MSB first, seed 0xFF)
//! of the 14-byte config-data block at offset 14. Brute-force bitwise
//! implementation; the block is tiny and this runs once per image.

/// Compute the CRC-8 of `data` with the given seed.
///
/// Polynomial 0x07, MSB-first, no reflection, no final XOR.
#[must_use]
pub fn crc8(seed: u8, data: &[u8]) -> u8 {
    let mut crc = seed;
    for &byte in data {
        let mut rem = byte ^ crc;
        for _ in 0..8 {
            if rem & 0x80 != 0 {
                rem = (rem << 1) ^ 0x07;
            } else {
                rem <<= 1;
            }
        }
        crc = rem;
    }
    crc
}
