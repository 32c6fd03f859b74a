//! Signup and verification input.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use katcakes_core::{Birthday, Email, Gender, PhoneNumber};

use crate::validation::ValidationErrors;

/// Length of an SMS verification code.
pub const CODE_LENGTH: usize = 6;

/// Display format of birthday dates on the signup form.
pub const BIRTHDAY_FORMAT: &str = "%d/%m/%Y";

/// A 6-digit SMS code. Never printed.
#[derive(Debug, Clone)]
pub struct VerificationCode(SecretString);

impl VerificationCode {
    /// Parse what the customer typed. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `code` field error unless the input is exactly six ASCII digits.
    pub fn parse(input: &str) -> Result<Self, ValidationErrors> {
        let code = input.trim();
        if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            let mut errors = ValidationErrors::new();
            errors.push("code", "O código deve ter 6 dígitos.");
            return Err(errors);
        }
        Ok(Self(SecretString::from(code.to_owned())))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Parse a `DD/MM/YYYY` date.
#[must_use]
pub fn parse_birthday_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), BIRTHDAY_FORMAT).ok()
}

/// Birthday row as typed on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthdayInput {
    pub name: String,
    /// `DD/MM/YYYY`.
    pub date: String,
}

/// Raw signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub display_name: String,
    pub phone_number: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub birthdays: Vec<BirthdayInput>,
}

/// A signup form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupProfile {
    pub display_name: String,
    pub phone_number: PhoneNumber,
    pub email: Option<Email>,
    pub gender: Option<Gender>,
    pub birthdays: Vec<Birthday>,
}

impl SignupRequest {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<SignupProfile, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let display_name = self.display_name.trim();
        errors.check(display_name.is_empty(), "displayName", "Indique o seu nome.");

        let phone_number = match PhoneNumber::parse(&self.phone_number) {
            Ok(phone) => Some(phone),
            Err(_) => {
                errors.push("phoneNumber", "Número de telefone inválido.");
                None
            }
        };

        let email = match self.email.trim() {
            "" => None,
            email => match Email::parse(email) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("email", "Endereço de email inválido.");
                    None
                }
            },
        };

        errors.check(
            self.birthdays.is_empty(),
            "birthdays",
            "Adicione pelo menos um aniversário.",
        );
        let mut birthdays = Vec::with_capacity(self.birthdays.len());
        for input in &self.birthdays {
            let name = input.name.trim();
            errors.check(name.is_empty(), "birthdays", "Indique de quem é o aniversário.");
            match parse_birthday_date(&input.date) {
                Some(date) => birthdays.push(Birthday {
                    name: name.to_owned(),
                    date,
                }),
                None => errors.push("birthdays", "Use o formato DD/MM/AAAA."),
            }
        }

        match phone_number {
            Some(phone_number) if errors.is_empty() => Ok(SignupProfile {
                display_name: display_name.to_owned(),
                phone_number,
                email,
                gender: self.gender,
                birthdays,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a login phone number.
pub(crate) fn parse_phone(input: &str) -> Result<PhoneNumber, ValidationErrors> {
    PhoneNumber::parse(input).map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.push("phoneNumber", "Número de telefone inválido.");
        errors
    })
}
