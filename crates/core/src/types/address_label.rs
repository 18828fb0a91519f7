//! Address label type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an [`AddressLabel`] from an unknown string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("address label must be Home, Office, or Work")]
pub struct AddressLabelError;

/// The kind of place a saved address points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressLabel {
    Home,
    Office,
    Work,
}

impl AddressLabel {
    /// Canonical display string, also the stored database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Office => "Office",
            Self::Work => "Work",
        }
    }
}

impl fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AddressLabel {
    type Err = AddressLabelError;

    /// Case-insensitive: form submissions arrive in whatever case the
    /// markup used.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "office" => Ok(Self::Office),
            "work" => Ok(Self::Work),
            _ => Err(AddressLabelError),
        }
    }
}

// SQLx support (with postgres feature): stored as TEXT
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for AddressLabel {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for AddressLabel {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for AddressLabel {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("home".parse::<AddressLabel>().unwrap(), AddressLabel::Home);
        assert_eq!("HOME".parse::<AddressLabel>().unwrap(), AddressLabel::Home);
        assert_eq!(
            " Office ".parse::<AddressLabel>().unwrap(),
            AddressLabel::Office
        );
        assert_eq!("Work".parse::<AddressLabel>().unwrap(), AddressLabel::Work);
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        assert!("garage".parse::<AddressLabel>().is_err());
        assert!("".parse::<AddressLabel>().is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(AddressLabel::Home.to_string(), "Home");
        assert_eq!(AddressLabel::Office.to_string(), "Office");
        assert_eq!(AddressLabel::Work.to_string(), "Work");
    }
}
