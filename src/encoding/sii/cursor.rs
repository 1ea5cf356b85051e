// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Category framing: TLV frames of the PROM category region.
//!
//! Every category is `<id: u16 LE><len_words: u16 LE><payload>` where the
//! payload is zero-padded to a 16-bit word boundary and `len_words` counts
//! padded words. The stream ends at id `0xFFFF`.
//!
//! The write side renders each payload into a local buffer and only then
//! appends `id + length + payload + pad` to the parent, so frames compose
//! without in-place length patching. The read side walks frames from a
//! fixed origin; hitting the terminator is the normal end-of-stream
//! signal (`Ok(None)`), never an error.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{Result, SiiError};

/// Category id terminating the stream.
pub const CAT_END: u16 = 0xFFFF;

/// Append one category frame to `buf`.
///
/// `body` renders the raw payload; this function adds the id, the
/// length-in-words field and the pad byte for odd payloads. Fails with
/// [`SiiError::OutOfRange`] if the padded payload exceeds `0xFFFF` words.
pub fn write_category<F>(buf: &mut Vec<u8>, id: u16, body: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut payload = Vec::new();
    body(&mut payload)?;
    if payload.len() % 2 != 0 {
        payload.push(0);
    }
    let words = payload.len() / 2;
    if words > usize::from(u16::MAX) {
        return Err(SiiError::out_of_range(
            "category length words",
            words as i64,
            i64::from(u16::MAX),
        ));
    }
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&(words as u16).to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(())
}

/// Read cursor over one category payload.
///
/// Primitive readers advance the cursor and fail with
/// [`SiiError::TruncatedProm`] when fewer bytes remain than requested.
#[derive(Debug, Clone)]
pub struct Cat<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cat<'a> {
    /// Walk the category stream starting at `origin`.
    #[must_use]
    pub fn walk(buf: &'a [u8], origin: usize) -> CatWalk<'a> {
        CatWalk { buf, pos: origin }
    }

    /// Scan from `origin` for the category with id `want_id`.
    ///
    /// Returns `Ok(None)` when the terminator is reached first; callers
    /// that demanded the category convert that into
    /// [`SiiError::CategoryNotFound`].
    pub fn seek(buf: &'a [u8], origin: usize, want_id: u16) -> Result<Option<Cat<'a>>> {
        let mut walk = Cat::walk(buf, origin);
        while let Some((id, cat)) = walk.next_category()? {
            if id == want_id {
                return Ok(Some(cat));
            }
        }
        Ok(None)
    }

    /// Like [`Cat::seek`], but for callers that demand the category.
    ///
    /// Fails with [`SiiError::CategoryNotFound`] when the terminator is
    /// reached without finding `want_id`.
    pub fn require(buf: &'a [u8], origin: usize, want_id: u16) -> Result<Cat<'a>> {
        Cat::seek(buf, origin, want_id)?.ok_or_else(|| SiiError::category_not_found(want_id))
    }

    /// Padded payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.end - self.pos
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        let bytes = self.bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a little-endian u16.
    pub fn u16(&mut self) -> Result<u16> {
        let bytes = self.bytes(2)?;
        Ok(LittleEndian::read_u16(bytes))
    }

    /// Read a little-endian u32.
    pub fn u32(&mut self) -> Result<u32> {
        let bytes = self.bytes(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    /// Read a raw byte slice of length `n`.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(SiiError::truncated(n, self.remaining(), self.pos));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.bytes(n).map(|_| ())
    }
}

/// Walker over consecutive `(id, length)` frames.
#[derive(Debug)]
pub struct CatWalk<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> CatWalk<'a> {
    /// Advance to the next frame.
    ///
    /// Yields `Ok(None)` at the terminator. A frame header that does not
    /// fit, or a declared length overrunning the buffer, is corruption
    /// and fails with [`SiiError::TruncatedProm`].
    pub fn next_category(&mut self) -> Result<Option<(u16, Cat<'a>)>> {
        let avail = self.buf.len().saturating_sub(self.pos);
        if avail < 2 {
            return Err(SiiError::truncated(2, avail, self.pos));
        }
        let id = LittleEndian::read_u16(&self.buf[self.pos..]);
        if id == CAT_END {
            self.pos += 2;
            return Ok(None);
        }
        if avail < 4 {
            return Err(SiiError::truncated(4, avail, self.pos));
        }
        let len_words = LittleEndian::read_u16(&self.buf[self.pos + 2..]);
        let payload_start = self.pos + 4;
        let payload_len = usize::from(len_words) * 2;
        if self.buf.len() - payload_start < payload_len {
            return Err(SiiError::truncated(
                payload_len,
                self.buf.len() - payload_start,
                payload_start,
            ));
        }
        let cat = Cat {
            buf: self.buf,
            pos: payload_start,
            end: payload_start + payload_len,
        };
        self.pos = payload_start + payload_len;
        Ok(Some((id, cat)))
    }
}
