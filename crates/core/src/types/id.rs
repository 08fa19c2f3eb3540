//! Identifier for directory submissions.
//!
//! Submission IDs are opaque strings issued by the external intake flow. The
//! only structural rule enforced here is that an ID is non-empty once
//! surrounding whitespace is removed.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SubmissionId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionIdError {
    /// The input is empty or whitespace only.
    #[error("submission id cannot be empty")]
    Empty,
}

/// An opaque submission identifier.
///
/// ```
/// use localguide_core::SubmissionId;
///
/// let id = SubmissionId::parse("  abc123 ").unwrap();
/// assert_eq!(id.as_str(), "abc123");
///
/// assert!(SubmissionId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Parse a `SubmissionId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionIdError::Empty`] if nothing remains after trimming.
    pub fn parse(s: &str) -> Result<Self, SubmissionIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SubmissionIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubmissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for SubmissionId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SubmissionId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for SubmissionId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = SubmissionId::parse("\tabc123\n").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_parse_rejects_blank() {
        for value in ["", " ", "\t\n", "   \r\n  "] {
            assert_eq!(SubmissionId::parse(value), Err(SubmissionIdError::Empty));
        }
    }

    #[test]
    fn test_display() {
        let id = SubmissionId::parse("abc123").unwrap();
        assert_eq!(id.to_string(), "abc123");
    }
}
