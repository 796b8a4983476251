//! URL-safe handle type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Handle`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum HandleError {
    /// The input string is empty.
    #[error("handle cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("handle must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("handle contains invalid character: {0:?}")]
    InvalidChar(char),
}

/// A unique, URL-safe slug identifying a product or collection.
///
/// Handles are the stable public lookup key, distinct from the internal id.
///
/// ## Constraints
///
/// - Length: 1-128 characters
/// - Only lowercase ASCII letters, digits, and hyphens
///
/// ## Examples
///
/// ```
/// use madreselva_core::Handle;
///
/// assert!(Handle::parse("pijama-saten-rosa").is_ok());
/// assert!(Handle::parse("hidden-homepage-carousel").is_ok());
///
/// assert!(Handle::parse("").is_err());            // empty
/// assert!(Handle::parse("Pijama Rosa").is_err()); // uppercase + space
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Maximum length of a handle.
    pub const MAX_LENGTH: usize = 128;

    /// Prefix marking collections used only for internal curation.
    ///
    /// Hidden collections are excluded from public collection listings
    /// and sitemap-style enumerations.
    pub const HIDDEN_PREFIX: &'static str = "hidden-";

    /// Parse a `Handle` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters,
    /// or contains characters outside `[a-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, HandleError> {
        if s.is_empty() {
            return Err(HandleError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(HandleError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(HandleError::InvalidChar(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Handle` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this handle marks an internal curation entity.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.0.starts_with(Self::HIDDEN_PREFIX)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Handle {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Handle {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Handle {
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
    fn test_parse_valid_handles() {
        assert!(Handle::parse("pijama-largo").is_ok());
        assert!(Handle::parse("pijamas-2024").is_ok());
        assert!(Handle::parse("a").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Handle::parse(""), Err(HandleError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Handle::MAX_LENGTH + 1);
        assert!(matches!(
            Handle::parse(&long),
            Err(HandleError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_chars() {
        assert!(matches!(
            Handle::parse("Pijama"),
            Err(HandleError::InvalidChar('P'))
        ));
        assert!(matches!(
            Handle::parse("pijama rosa"),
            Err(HandleError::InvalidChar(' '))
        ));
        assert!(matches!(
            Handle::parse("pijama_rosa"),
            Err(HandleError::InvalidChar('_'))
        ));
    }

    #[test]
    fn test_is_hidden() {
        assert!(Handle::parse("hidden-homepage-carousel").unwrap().is_hidden());
        assert!(!Handle::parse("pijamas-largos").unwrap().is_hidden());
    }

    #[test]
    fn test_serde_roundtrip() {
        let handle = Handle::parse("pijama-saten").unwrap();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"pijama-saten\"");

        let parsed: Handle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, handle);
    }
}
