//! Core types for Local Guide.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{SubmissionId, SubmissionIdError};
pub use price::{CurrencyCode, Price};
pub use status::*;
