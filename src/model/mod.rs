// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Slave device data model.
//!
//! The descriptor hierarchy mirrors the structure of an EtherCAT slave
//! information (ESI) device section, but strongly typed:
//! - [`DeviceDescriptor`] - the whole device
//! - [`PdoDescriptor`] / [`PdoEntry`] - process data objects
//! - [`SyncManager`] / [`FmmuUsage`] - hardware buffer descriptors
//! - [`MailboxConfig`] / [`MailboxProtocols`] - mailbox capabilities
//! - [`VendorCategory`] - opaque vendor extensions

pub mod device;
pub mod pdo;

pub use device::{
    BehaviorFlags, CoeDetails, DeviceDescriptor, FmmuUsage, MailboxConfig, MailboxProtocols,
    MailboxSlot, SmPurpose, SyncManager, VendorCategory,
};
pub use pdo::{BaseType, PdoDescriptor, PdoEntry, PdoKind};
