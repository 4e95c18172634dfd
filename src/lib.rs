// Copyright 2026 apkscout contributors
// SPDX-License-Identifier: Apache-2.0

//! apkscout resolves app/version/variant requests against APK mirror
//! sites into concrete download URLs.
//!
//! The engine generates candidate release URLs from a version string,
//! accepts the first page showing real evidence of that version, picks the
//! build variant matching the requested criteria, and extracts the final
//! download link. [`resolve::Resolver`] is the entry point; the binary in
//! `main.rs` wraps it in a catalog-driven CLI.

pub mod catalog;
pub mod cli;
pub mod download;
pub mod error;
pub mod events;
pub mod fetch;
pub mod hints;
pub mod query;
pub mod resolve;
