//! Mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly ten digits long.
    #[error("phone number must be exactly 10 digits")]
    Length,
    /// The input contains characters other than digits.
    #[error("phone number must contain only digits")]
    NonNumeric,
    /// The first digit is outside the mobile range.
    #[error("phone number must start with 6, 7, 8, or 9")]
    LeadingDigit,
}

/// A ten-digit mobile phone number.
///
/// Numbers are stored without a country prefix. The leading digit must be
/// in the 6-9 mobile range; input is trimmed before validation.
///
/// ## Examples
///
/// ```
/// use marigold_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse(" 7012345678 ").is_ok());
///
/// assert!(Phone::parse("12345").is_err());       // too short
/// assert!(Phone::parse("1234567890").is_err());  // starts with 1
/// assert!(Phone::parse("98765-4321").is_err());  // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required number of digits.
    pub const LENGTH: usize = 10;

    /// Parse a `Phone` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not exactly ten
    /// characters, contains a non-digit, or starts with a digit below 6.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        if trimmed.chars().count() != Self::LENGTH {
            return Err(PhoneError::Length);
        }

        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonNumeric);
        }

        if !trimmed.starts_with(['6', '7', '8', '9']) {
            return Err(PhoneError::LeadingDigit);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
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
    fn test_parse_valid_numbers() {
        assert!(Phone::parse("9876543210").is_ok());
        assert!(Phone::parse("6000000000").is_ok());
        assert!(Phone::parse("7999999999").is_ok());
        assert!(Phone::parse("8123456789").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let phone = Phone::parse("  9876543210  ").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(Phone::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(Phone::parse("98765"), Err(PhoneError::Length)));
        assert!(matches!(
            Phone::parse("98765432100"),
            Err(PhoneError::Length)
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            Phone::parse("98765-4321"),
            Err(PhoneError::NonNumeric)
        ));
        assert!(matches!(
            Phone::parse("98765abcde"),
            Err(PhoneError::NonNumeric)
        ));
    }

    #[test]
    fn test_parse_invalid_leading_digit() {
        assert!(matches!(
            Phone::parse("1234567890"),
            Err(PhoneError::LeadingDigit)
        ));
        assert!(matches!(
            Phone::parse("5876543210"),
            Err(PhoneError::LeadingDigit)
        ));
    }

    #[test]
    fn test_display() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(format!("{phone}"), "9876543210");
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("9876543210").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"9876543210\"");

        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }
}
