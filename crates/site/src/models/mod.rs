//! Domain models for the site.

pub mod profile;
pub mod session;
pub mod submission;

pub use profile::{ADMIN_ROLE, Profile};
pub use session::{AuthTokens, keys as session_keys};
pub use submission::{StatusChange, Submission};
