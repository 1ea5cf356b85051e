// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PROM encoder: assembles the complete SII image from a descriptor.
//!
//! Emission order is fixed by the binary specification: the 128-byte
//! header, then device-specific vendor categories, Strings (10), General
//! (30), FMMU (40, if any), SyncManager (41, if any), TxPDO (50), RxPDO
//! (51), and the `0xFFFF` terminator.

use tracing::debug;

use crate::core::{Result, SiiError};
use crate::encoding::sii::crc::crc8;
use crate::encoding::sii::cursor::{write_category, CAT_END};
use crate::encoding::sii::strings::StringTable;
use crate::encoding::sii::{
    is_vendor_category, BOOTSTRAP_LEN, CAT_FMMU, CAT_GENERAL, CAT_RXPDO, CAT_STRINGS,
    CAT_SYNC_MANAGER, CAT_TXPDO, CONFIG_DATA_LEN, CRC_SEED, HEADER_LEN, LAYOUT_VERSION, MAX_FMMUS,
};
use crate::model::{DeviceDescriptor, MailboxProtocols, PdoDescriptor, PdoKind, SmPurpose};

/// Encode a descriptor into a complete PROM image.
///
/// Returns the full byte sequence including the terminator, or an error;
/// never a partial image.
pub fn encode(device: &DeviceDescriptor) -> Result<Vec<u8>> {
    PromEncoder::new().encode(device)
}

/// One-shot PROM image builder.
///
/// Owns the output buffer and the per-call [`StringTable`]; consumed by
/// [`PromEncoder::encode`].
pub struct PromEncoder {
    buf: Vec<u8>,
    strings: StringTable,
}

impl Default for PromEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromEncoder {
    /// Create an encoder with an empty output buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(HEADER_LEN * 2),
            strings: StringTable::new(),
        }
    }

    /// Assemble the image for `device`.
    pub fn encode(mut self, device: &DeviceDescriptor) -> Result<Vec<u8>> {
        self.header(device)?;
        self.intern_strings(device)?;

        for cat in &device.vendor_categories {
            // reserved ids would collide with the standard categories
            if !is_vendor_category(cat.id) {
                return Err(SiiError::out_of_range(
                    "vendor category id",
                    i64::from(cat.id),
                    0xFFFE,
                ));
            }
            write_category(&mut self.buf, cat.id, |out| {
                out.extend_from_slice(&cat.data);
                Ok(())
            })?;
        }

        self.cat_strings()?;
        self.cat_general(device)?;
        if !device.fmmus.is_empty() {
            self.cat_fmmu(device)?;
        }
        if !device.sync_managers.is_empty() {
            self.cat_sync_managers(device)?;
        }
        self.cat_pdo(CAT_TXPDO, PdoKind::Tx, device.tx_pdo.as_ref())?;
        self.cat_pdo(CAT_RXPDO, PdoKind::Rx, device.rx_pdo.as_ref())?;

        self.buf.extend_from_slice(&CAT_END.to_le_bytes());
        debug!(len = self.buf.len(), "assembled PROM image");
        Ok(self.buf)
    }

    /// Emit the fixed 128-byte header region.
    fn header(&mut self, device: &DeviceDescriptor) -> Result<()> {
        if device.config_data.len() > CONFIG_DATA_LEN {
            return Err(SiiError::out_of_range(
                "config data length",
                device.config_data.len() as i64,
                CONFIG_DATA_LEN as i64,
            ));
        }
        let mut block = [0u8; CONFIG_DATA_LEN];
        block[..device.config_data.len()].copy_from_slice(&device.config_data);
        self.buf.extend_from_slice(&block);
        self.buf.push(crc8(CRC_SEED, &block));
        self.buf.push(0x00);

        let vendor_id = device
            .vendor_id
            .ok_or_else(|| SiiError::missing_field("vendor id"))?;
        self.u32(vendor_id);
        self.u32(device.product_code);
        self.u32(device.revision_no);
        self.u32(device.serial_no);

        self.pad(8);

        match &device.bootstrap {
            Some(data) => {
                if data.len() > BOOTSTRAP_LEN {
                    return Err(SiiError::out_of_range(
                        "bootstrap mailbox length",
                        data.len() as i64,
                        BOOTSTRAP_LEN as i64,
                    ));
                }
                let mut block = [0u8; BOOTSTRAP_LEN];
                block[..data.len()].copy_from_slice(data);
                self.buf.extend_from_slice(&block);
            }
            None => self.pad(BOOTSTRAP_LEN),
        }

        // standard mailbox slots, preferring the sync-manager records
        for (purpose, fallback) in [
            (
                SmPurpose::MBoxOut,
                device.mailbox.as_ref().and_then(|m| m.out_slot),
            ),
            (
                SmPurpose::MBoxIn,
                device.mailbox.as_ref().and_then(|m| m.in_slot),
            ),
        ] {
            if let Some(sm) = device.find_sm(purpose) {
                self.u16(sm.start);
                self.u16(sm.size);
            } else if let Some(slot) = fallback {
                self.u16(slot.start);
                self.u16(slot.size);
            } else {
                self.pad(4);
            }
        }

        let protocols = device
            .mailbox
            .as_ref()
            .map(|m| m.protocols)
            .unwrap_or_default();
        self.u16(protocols.bits());

        self.pad(66);

        let size_word = i64::from(device.eeprom_byte_size) * 8 / 1024 - 1;
        if size_word < 0 || size_word > i64::from(u16::MAX) {
            return Err(SiiError::out_of_range(
                "eeprom size word",
                size_word,
                i64::from(u16::MAX),
            ));
        }
        self.u16(size_word as u16);
        self.u16(LAYOUT_VERSION);

        debug_assert_eq!(self.buf.len(), HEADER_LEN);
        Ok(())
    }

    /// Populate the string table in the fixed first-use order.
    fn intern_strings(&mut self, device: &DeviceDescriptor) -> Result<()> {
        self.strings.add_or_get(&device.group_type)?;
        self.strings.add_or_get(&device.device_type)?;
        self.strings.add_or_get(&device.name)?;
        for pdo in [&device.tx_pdo, &device.rx_pdo].into_iter().flatten() {
            self.strings.add_or_get(&pdo.name)?;
            for ent in &pdo.entries {
                self.strings.add_or_get(&ent.name)?;
            }
        }
        Ok(())
    }

    /// Category 10: the string table itself.
    fn cat_strings(&mut self) -> Result<()> {
        let strings = &self.strings;
        write_category(&mut self.buf, CAT_STRINGS, |out| {
            strings.write_payload(out);
            Ok(())
        })
    }

    /// Category 30: General.
    fn cat_general(&mut self, device: &DeviceDescriptor) -> Result<()> {
        let grp_idx = self.strings.add_or_get(&device.group_type)?;
        let type_idx = self.strings.add_or_get(&device.device_type)?;
        let name_idx = self.strings.add_or_get(&device.name)?;

        let mut body = Vec::with_capacity(32);
        body.push(grp_idx);
        // ImageData16x14 slot; obsolete in the file specification and its
        // prom encoding is unclear, always emitted as zero
        body.push(0x00);
        body.push(type_idx);
        body.push(name_idx);
        body.push(0x00);

        match &device.mailbox {
            Some(m) => {
                let mut coe = 0u8;
                if m.protocols.contains(MailboxProtocols::COE) {
                    coe = 0x01 | m.coe_details.detail_bits();
                }
                body.push(coe);
                body.push(u8::from(m.protocols.contains(MailboxProtocols::FOE)));
                body.push(u8::from(m.protocols.contains(MailboxProtocols::EOE)));
            }
            None => body.extend_from_slice(&[0, 0, 0]),
        }
        body.extend_from_slice(&[0, 0, 0]);

        let mut flags = 0u8;
        if device.behavior.start_to_saveop_no_sync {
            flags |= 0x01;
        }
        if device.behavior.use_lrd_lwr {
            flags |= 0x02;
        }
        if device.mailbox.as_ref().is_some_and(|m| m.data_link_layer) {
            flags |= 0x04;
        }
        if device.behavior.identification_reg134 {
            flags |= 0x08;
        }
        if device.identification_ado.is_some() {
            flags |= 0x10;
        }
        body.push(flags);

        body.extend_from_slice(&device.ebus_current.to_le_bytes());
        // the specification duplicates the group type index here; meaning
        // of the duplicate is not documented
        body.push(grp_idx);
        body.push(0x00);

        let mut port = 0u16;
        for (shift, c) in device.physics.chars().take(4).enumerate() {
            // 'K' (LVDS) has no documented prom nibble and maps to 0
            let nibble: u16 = match c {
                'Y' => 0x1,
                'H' => 0x4,
                _ => 0x0,
            };
            port |= nibble << (4 * shift);
        }
        body.extend_from_slice(&port.to_le_bytes());

        body.extend_from_slice(&device.identification_ado.unwrap_or(0).to_le_bytes());
        body.extend_from_slice(&[0u8; 12]);

        write_category(&mut self.buf, CAT_GENERAL, |out| {
            out.extend_from_slice(&body);
            Ok(())
        })
    }

    /// Category 40: FMMU usage codes, up to 4.
    fn cat_fmmu(&mut self, device: &DeviceDescriptor) -> Result<()> {
        if device.fmmus.len() > MAX_FMMUS {
            return Err(SiiError::too_many("FMMU entries", device.fmmus.len(), MAX_FMMUS));
        }
        let fmmus = &device.fmmus;
        write_category(&mut self.buf, CAT_FMMU, |out| {
            for fmmu in fmmus {
                out.push(*fmmu as u8);
            }
            Ok(())
        })
    }

    /// Category 41: sync-manager records, 8 bytes each.
    fn cat_sync_managers(&mut self, device: &DeviceDescriptor) -> Result<()> {
        let sms = &device.sync_managers;
        write_category(&mut self.buf, CAT_SYNC_MANAGER, |out| {
            for sm in sms {
                out.extend_from_slice(&sm.start.to_le_bytes());
                out.extend_from_slice(&sm.size.to_le_bytes());
                out.push(sm.control);
                out.push(0x00);
                out.push(sm.enable);
                out.push(sm.purpose as u8);
            }
            Ok(())
        })
    }

    /// Category 50/51: one PDO with its entries. The category is emitted
    /// even without a PDO (empty payload), matching existing images.
    fn cat_pdo(&mut self, cat_id: u16, kind: PdoKind, pdo: Option<&PdoDescriptor>) -> Result<()> {
        let mut body = Vec::new();
        if let Some(pdo) = pdo {
            pdo.validate()?;

            body.extend_from_slice(&pdo.index.to_le_bytes());
            body.push(pdo.entries.len() as u8);
            body.push(pdo.sm.unwrap_or_else(|| kind.default_sm()));
            // DC sync byte, not attributed by the specification
            body.push(0x00);
            body.push(self.strings.add_or_get(&pdo.name)?);

            let mut flags = 0u16;
            if pdo.mandatory {
                flags |= 0x0001;
            }
            if pdo.sm.is_some() {
                flags |= 0x0002;
            }
            if pdo.fixed {
                flags |= 0x0010;
            }
            if pdo.virtual_ {
                flags |= 0x0020;
            }
            body.extend_from_slice(&flags.to_le_bytes());

            for ent in &pdo.entries {
                body.extend_from_slice(&ent.index.to_le_bytes());
                let sub = if ent.index == 0 {
                    ent.sub_index.unwrap_or(1)
                } else {
                    ent.sub_index
                        .ok_or_else(|| SiiError::missing_field("PDO entry subindex"))?
                };
                body.push(sub);
                body.push(self.strings.add_or_get(&ent.name)?);
                body.push(ent.data_type.code());
                body.push(ent.bit_len);
                body.extend_from_slice(&[0, 0]);
            }
        }
        write_category(&mut self.buf, cat_id, |out| {
            out.extend_from_slice(&body);
            Ok(())
        })
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn pad(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }
}
