// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! PROM decoder: rebuilds a descriptor from an SII image.
//!
//! Decoding is strict about structural integrity (header length, CRC,
//! layout version, category framing) and lenient about content it can
//! tolerate: short General payloads from older images are zero-extended,
//! unknown category ids are skipped, both with a warning.

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use crate::core::{Result, SiiError};
use crate::encoding::sii::crc::crc8;
use crate::encoding::sii::cursor::Cat;
use crate::encoding::sii::strings::StringTable;
use crate::encoding::sii::{
    is_vendor_category, BOOTSTRAP_LEN, CAT_FMMU, CAT_GENERAL, CAT_RXPDO, CAT_STRINGS,
    CAT_SYNC_MANAGER, CAT_TXPDO, CONFIG_DATA_LEN, CRC_SEED, GENERAL_PAYLOAD_LEN, HEADER_LEN,
    LAYOUT_VERSION,
};
use crate::model::{
    BaseType, BehaviorFlags, CoeDetails, DeviceDescriptor, FmmuUsage, MailboxConfig,
    MailboxProtocols, MailboxSlot, PdoDescriptor, PdoEntry, PdoKind, SmPurpose, SyncManager,
    VendorCategory,
};

/// Decode a PROM image into a descriptor and its string table.
///
/// The table is returned alongside the descriptor so callers can inspect
/// the exact image-order strings; the descriptor itself carries all names
/// already resolved.
pub fn decode(prom: &[u8]) -> Result<(DeviceDescriptor, StringTable)> {
    PromDecoder::new(prom).decode()
}

/// One-shot PROM image reader.
pub struct PromDecoder<'a> {
    prom: &'a [u8],
}

/// Mailbox-related bits scattered across the header and the General
/// category, merged into one `Option<MailboxConfig>` after the walk.
#[derive(Default)]
struct MailboxParts {
    protocols: MailboxProtocols,
    coe_details: CoeDetails,
    data_link_layer: bool,
    out_slot: Option<MailboxSlot>,
    in_slot: Option<MailboxSlot>,
}

impl<'a> PromDecoder<'a> {
    /// Create a decoder over `prom`.
    #[must_use]
    pub fn new(prom: &'a [u8]) -> Self {
        Self { prom }
    }

    /// Parse the full image.
    pub fn decode(self) -> Result<(DeviceDescriptor, StringTable)> {
        if self.prom.len() < HEADER_LEN {
            return Err(SiiError::truncated(HEADER_LEN, self.prom.len(), 0));
        }

        let mut device = DeviceDescriptor::default();
        let mut mbox = MailboxParts::default();
        self.header(&mut device, &mut mbox)?;

        // the string table is needed before any category referencing it
        let strings = match Cat::seek(self.prom, HEADER_LEN, CAT_STRINGS)? {
            Some(mut cat) => StringTable::read_payload(&mut cat)?,
            None => StringTable::new(),
        };

        let mut walk = Cat::walk(self.prom, HEADER_LEN);
        while let Some((id, mut cat)) = walk.next_category()? {
            match id {
                CAT_STRINGS => {}
                CAT_GENERAL => self.general(&mut cat, &strings, &mut device, &mut mbox)?,
                CAT_FMMU => self.fmmus(&mut cat, &mut device)?,
                CAT_SYNC_MANAGER => self.sync_managers(&mut cat, &mut device)?,
                CAT_TXPDO => {
                    device.tx_pdo = self.pdo(&mut cat, PdoKind::Tx, &strings, &device.tx_pdo)?;
                }
                CAT_RXPDO => {
                    device.rx_pdo = self.pdo(&mut cat, PdoKind::Rx, &strings, &device.rx_pdo)?;
                }
                id if is_vendor_category(id) => {
                    device.vendor_categories.push(VendorCategory {
                        id,
                        data: cat.bytes(cat.size())?.to_vec(),
                    });
                }
                id => {
                    warn!(category = id, len = cat.size(), "skipping unknown category");
                }
            }
        }

        device.mailbox = mbox.finish(&device);
        Ok((device, strings))
    }

    /// Parse the fixed 128-byte header region.
    fn header(&self, device: &mut DeviceDescriptor, mbox: &mut MailboxParts) -> Result<()> {
        let hdr = &self.prom[..HEADER_LEN];

        let computed = crc8(CRC_SEED, &hdr[..CONFIG_DATA_LEN]);
        if hdr[CONFIG_DATA_LEN] != computed {
            return Err(SiiError::checksum_mismatch(computed, hdr[CONFIG_DATA_LEN]));
        }
        let version = LittleEndian::read_u16(&hdr[126..]);
        if version != LAYOUT_VERSION {
            return Err(SiiError::version_mismatch(LAYOUT_VERSION, version));
        }

        device.config_data = hdr[..CONFIG_DATA_LEN].to_vec();
        device.vendor_id = Some(LittleEndian::read_u32(&hdr[16..]));
        device.product_code = LittleEndian::read_u32(&hdr[20..]);
        device.revision_no = LittleEndian::read_u32(&hdr[24..]);
        device.serial_no = LittleEndian::read_u32(&hdr[28..]);

        let bootstrap = &hdr[40..40 + BOOTSTRAP_LEN];
        if bootstrap.iter().any(|&b| b != 0) {
            device.bootstrap = Some(bootstrap.to_vec());
        }

        mbox.out_slot = read_slot(&hdr[48..52]);
        mbox.in_slot = read_slot(&hdr[52..56]);
        mbox.protocols = MailboxProtocols::from_bits(LittleEndian::read_u16(&hdr[56..]));

        let size_word = LittleEndian::read_u16(&hdr[124..]);
        device.eeprom_byte_size = (u32::from(size_word) + 1) * 128;
        Ok(())
    }

    /// Parse the General category (30).
    fn general(
        &self,
        cat: &mut Cat<'_>,
        strings: &StringTable,
        device: &mut DeviceDescriptor,
        mbox: &mut MailboxParts,
    ) -> Result<()> {
        let avail = cat.size();
        let mut body = [0u8; GENERAL_PAYLOAD_LEN];
        if avail < GENERAL_PAYLOAD_LEN {
            // older images carry a shorter layout; missing fields are zero
            warn!(
                len = avail,
                expected = GENERAL_PAYLOAD_LEN,
                "short General category, zero-extending"
            );
            body[..avail].copy_from_slice(cat.bytes(avail)?);
        } else {
            body.copy_from_slice(cat.bytes(GENERAL_PAYLOAD_LEN)?);
        }

        device.group_type = strings.resolve_or_empty(body[0])?;
        device.device_type = strings.resolve_or_empty(body[2])?;
        device.name = strings.resolve_or_empty(body[3])?;
        // body[14] duplicates the group type index; not read back

        if body[5] & 0x01 != 0 {
            mbox.protocols.insert(MailboxProtocols::COE);
            mbox.coe_details = CoeDetails::from_byte(body[5]);
        }
        if body[6] != 0 {
            mbox.protocols.insert(MailboxProtocols::FOE);
        }
        if body[7] != 0 {
            mbox.protocols.insert(MailboxProtocols::EOE);
        }

        let flags = body[11];
        device.behavior = BehaviorFlags {
            start_to_saveop_no_sync: flags & 0x01 != 0,
            use_lrd_lwr: flags & 0x02 != 0,
            identification_reg134: flags & 0x08 != 0,
        };
        mbox.data_link_layer = flags & 0x04 != 0;

        device.ebus_current = LittleEndian::read_u16(&body[12..]);

        let port = LittleEndian::read_u16(&body[16..]);
        let mut physics = String::new();
        for shift in 0..4 {
            match (port >> (4 * shift)) & 0xF {
                0x1 => physics.push('Y'),
                0x4 => physics.push('H'),
                0x0 => break,
                nibble => {
                    warn!(nibble, port = shift, "unknown port physics code");
                    break;
                }
            }
        }
        device.physics = physics;

        if flags & 0x10 != 0 {
            device.identification_ado = Some(LittleEndian::read_u16(&body[18..]));
        }
        Ok(())
    }

    /// Parse the FMMU category (40). Trailing unattributed slots are
    /// frame padding and dropped.
    fn fmmus(&self, cat: &mut Cat<'_>, device: &mut DeviceDescriptor) -> Result<()> {
        let mut fmmus: Vec<FmmuUsage> = cat
            .bytes(cat.size())?
            .iter()
            .map(|&b| FmmuUsage::from_code(b))
            .collect();
        while fmmus.last() == Some(&FmmuUsage::Unused) {
            fmmus.pop();
        }
        device.fmmus = fmmus;
        Ok(())
    }

    /// Parse the SyncManager category (41), 8 bytes per record.
    fn sync_managers(&self, cat: &mut Cat<'_>, device: &mut DeviceDescriptor) -> Result<()> {
        while cat.remaining() >= 8 {
            let start = cat.u16()?;
            let size = cat.u16()?;
            let control = cat.u8()?;
            cat.skip(1)?;
            let enable = cat.u8()?;
            let purpose = SmPurpose::from_code(cat.u8()?);
            device.sync_managers.push(SyncManager {
                start,
                size,
                control,
                enable,
                purpose,
            });
        }
        Ok(())
    }

    /// Parse a PDO category (50/51). An empty payload means the category
    /// was emitted without a PDO.
    fn pdo(
        &self,
        cat: &mut Cat<'_>,
        kind: PdoKind,
        strings: &StringTable,
        existing: &Option<PdoDescriptor>,
    ) -> Result<Option<PdoDescriptor>> {
        let mut kept = existing.clone();
        while cat.remaining() >= 8 {
            let pdo = self.pdo_record(cat, strings)?;
            if kept.is_some() {
                warn!(
                    kind = ?kind,
                    index = pdo.index,
                    "extra PDO record, keeping the first"
                );
            } else {
                kept = Some(pdo);
            }
        }
        Ok(kept)
    }

    fn pdo_record(&self, cat: &mut Cat<'_>, strings: &StringTable) -> Result<PdoDescriptor> {
        let index = cat.u16()?;
        let count = cat.u8()?;
        let sm_byte = cat.u8()?;
        cat.skip(1)?; // DC sync byte
        let name_idx = cat.u8()?;
        let flags = cat.u16()?;

        let mut pdo = PdoDescriptor {
            index,
            name: strings.resolve_or_empty(name_idx)?,
            sm: (flags & 0x0002 != 0).then_some(sm_byte),
            mandatory: flags & 0x0001 != 0,
            fixed: flags & 0x0010 != 0,
            virtual_: flags & 0x0020 != 0,
            entries: Vec::with_capacity(usize::from(count)),
        };

        for _ in 0..count {
            let ent_index = cat.u16()?;
            let sub = cat.u8()?;
            let ent_name_idx = cat.u8()?;
            let type_code = cat.u8()?;
            let bit_len = cat.u8()?;
            cat.skip(2)?;

            let data_type = BaseType::from_code(type_code)
                .ok_or_else(|| SiiError::unsupported_data_type(type_code))?;
            // padding entries encode a fixed subindex of 1
            let sub_index = if ent_index == 0 {
                (sub != 1).then_some(sub)
            } else {
                Some(sub)
            };
            pdo.entries.push(PdoEntry {
                index: ent_index,
                sub_index,
                name: strings.resolve_or_empty(ent_name_idx)?,
                data_type,
                bit_len,
            });
        }
        Ok(pdo)
    }
}

/// Slot words are `Some` only when nonzero; all-zero means "no mailbox".
fn read_slot(bytes: &[u8]) -> Option<MailboxSlot> {
    let start = LittleEndian::read_u16(&bytes[0..]);
    let size = LittleEndian::read_u16(&bytes[2..]);
    (start != 0 || size != 0).then_some(MailboxSlot { start, size })
}

impl MailboxParts {
    /// Merge the collected mailbox bits.
    ///
    /// Slots that merely restate a sync-manager record are dropped (the
    /// encoder writes them from the record). A config is materialized only
    /// when some mailbox signal exists; otherwise the device simply has no
    /// mailbox.
    fn finish(self, device: &DeviceDescriptor) -> Option<MailboxConfig> {
        let out_slot = match device.find_sm(SmPurpose::MBoxOut) {
            Some(_) => None,
            None => self.out_slot,
        };
        let in_slot = match device.find_sm(SmPurpose::MBoxIn) {
            Some(_) => None,
            None => self.in_slot,
        };
        let any = !self.protocols.is_empty()
            || self.data_link_layer
            || out_slot.is_some()
            || in_slot.is_some();
        any.then_some(MailboxConfig {
            protocols: self.protocols,
            coe_details: self.coe_details,
            data_link_layer: self.data_link_layer,
            out_slot,
            in_slot,
        })
    }
}
