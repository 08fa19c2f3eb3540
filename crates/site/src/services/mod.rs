//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Admin authorization gate and login redirects
//! - `identity` - Hosted identity service client
//! - `listing_cache` - Rendered moderation listing cache
//! - `moderation` - Submission status workflow
//! - `payments` - Payment processor client

pub mod auth;
pub mod identity;
pub mod listing_cache;
pub mod moderation;
pub mod payments;
