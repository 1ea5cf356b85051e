// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout siicodec.
//!
//! This module provides the foundational types for the library:
//! - [`SiiError`] - Comprehensive error handling
//! - [`Result`] - Crate-wide result alias

pub mod error;

pub use error::{Result, SiiError};
