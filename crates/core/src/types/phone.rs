//! Phone number type.
//!
//! Phone numbers are the account lookup key, so every number crossing the
//! boundary is normalized to E.164 before it is stored or compared.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits, separators or a leading `+`.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// A number without country code that is not a local mobile number.
    #[error("phone number must include a country code")]
    MissingCountryCode,
    /// Too few or too many digits for E.164.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number in canonical E.164 form (`+` followed by 8-15 digits).
///
/// ## Normalization
///
/// - Spaces, dashes, dots and parentheses are stripped
/// - A leading `00` international prefix becomes `+`
/// - A 9-digit local number starting with the mobile prefix `8` gets the
///   Mozambican country code (`+258`)
///
/// ## Examples
///
/// ```
/// use katcakes_core::PhoneNumber;
///
/// assert_eq!(PhoneNumber::parse("84 123 4567").unwrap().as_str(), "+258841234567");
/// assert_eq!(PhoneNumber::parse("+258 84-123-4567").unwrap().as_str(), "+258841234567");
/// assert_eq!(PhoneNumber::parse("00351912345678").unwrap().as_str(), "+351912345678");
/// assert!(PhoneNumber::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Country calling code inferred for local numbers.
    pub const DEFAULT_COUNTRY_CODE: &'static str = "258";

    /// Leading digit of local mobile numbers.
    pub const MOBILE_PREFIX: char = '8';

    /// Digit count of a local mobile number.
    pub const LOCAL_LENGTH: usize = 9;

    const MIN_DIGITS: usize = 8;
    const MAX_DIGITS: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or other
    /// symbols, lacks a country code (and is not a local mobile number), or
    /// has a digit count outside the E.164 range.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (explicit_plus, rest) = trimmed
            .strip_prefix('+')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let international = if explicit_plus {
            digits
        } else if let Some(stripped) = digits.strip_prefix("00") {
            stripped.to_owned()
        } else if digits.len() == Self::LOCAL_LENGTH && digits.starts_with(Self::MOBILE_PREFIX) {
            format!("{}{digits}", Self::DEFAULT_COUNTRY_CODE)
        } else if digits.starts_with(Self::DEFAULT_COUNTRY_CODE)
            && digits.len() == Self::DEFAULT_COUNTRY_CODE.len() + Self::LOCAL_LENGTH
        {
            digits
        } else {
            return Err(PhoneError::MissingCountryCode);
        };

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&international.len())
            || international.starts_with('0')
        {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(format!("+{international}")))
    }

    /// Returns the E.164 representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits, for log lines that must not carry the full number.
    #[must_use]
    pub fn masked(&self) -> String {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("***{tail}")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_mobile_number_gets_country_code() {
        let phone = PhoneNumber::parse("841234567").unwrap();
        assert_eq!(phone.as_str(), "+258841234567");
    }

    #[test]
    fn test_separators_are_stripped() {
        let phone = PhoneNumber::parse(" (84) 123-45.67 ").unwrap();
        assert_eq!(phone.as_str(), "+258841234567");
    }

    #[test]
    fn test_country_code_without_plus() {
        let phone = PhoneNumber::parse("258841234567").unwrap();
        assert_eq!(phone.as_str(), "+258841234567");
    }

    #[test]
    fn test_double_zero_prefix() {
        let phone = PhoneNumber::parse("0027821234567").unwrap();
        assert_eq!(phone.as_str(), "+27821234567");
    }

    #[test]
    fn test_local_non_mobile_is_rejected() {
        assert_eq!(
            PhoneNumber::parse("212345678"),
            Err(PhoneError::MissingCountryCode)
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(PhoneNumber::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_letters_rejected() {
        assert_eq!(
            PhoneNumber::parse("84abc4567"),
            Err(PhoneError::InvalidCharacter('a'))
        );
    }

    #[test]
    fn test_too_long() {
        assert!(matches!(
            PhoneNumber::parse("+1234567890123456"),
            Err(PhoneError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_masked() {
        let phone = PhoneNumber::parse("841234567").unwrap();
        assert_eq!(phone.masked(), "***4567");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let phone: PhoneNumber = serde_json::from_str("\"84 123 4567\"").unwrap();
        assert_eq!(phone.as_str(), "+258841234567");
        assert!(serde_json::from_str::<PhoneNumber>("\"nope\"").is_err());
    }
}
