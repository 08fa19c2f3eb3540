//! Local Guide Core - Shared types library.
//!
//! This crate provides common types used across all Local Guide components:
//! - `site` - Directory website, admin moderation console, and payment endpoints
//! - `cli` - Command-line tools for migrations and inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for submission IDs, prices, emails, and statuses
//! - [`catalog`] - The fixed price table used by the payment endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
