//! Customer account types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::phone::PhoneNumber;

/// Self-declared gender on the signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            "prefer_not_to_say" => Ok(Self::PreferNotToSay),
            _ => Err(format!("invalid gender: {s}")),
        }
    }
}

/// A birthday the customer wants to be reminded about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthday {
    /// Whose birthday it is.
    pub name: String,
    pub date: NaiveDate,
}

/// A customer account.
///
/// There is no password: the phone number is the lookup key and possession
/// of it is proven with an SMS challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub user_id: UserId,
    pub display_name: String,
    pub phone_number: PhoneNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birthdays: Vec<Birthday>,
}
