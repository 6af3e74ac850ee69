//! # Request Primitives
//!
//! Phone numbers, email addresses and one-time codes as accepted by the
//! sign-in endpoints. Each type validates its format at construction time,
//! trimming surrounding whitespace first.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+]?[\s0-9]+)?(\d{3}|[(]?[0-9]+[)])?(-?\s?[0-9])+$")
            .expect("phone pattern is a valid regex")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .expect("email pattern is a valid regex")
    })
}

/// A phone number in loosely international format (`+233 123 456 789`,
/// `(020) 123-4567`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and wrap a phone number.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required("Phone number"));
        }
        if !phone_pattern().is_match(trimmed) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The normalized phone number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An email address of the form `local@domain.tld`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and wrap an email address.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required("Email"));
        }
        if !email_pattern().is_match(trimmed) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The normalized email address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A six-digit one-time code.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LEN: usize = 6;

    /// Validate and wrap a one-time code.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required("Token number"));
        }
        if trimmed.len() != Self::LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidOtpCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The code digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

/// Where the provider delivers a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    /// Plain text message.
    Sms,
    /// WhatsApp message.
    Whatsapp,
}

impl OtpChannel {
    /// Wire name of the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Whatsapp => "whatsapp",
        }
    }
}

impl std::str::FromStr for OtpChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sms" => Ok(Self::Sms),
            "whatsapp" => Ok(Self::Whatsapp),
            other => Err(ValidationError::InvalidChannel(other.to_string())),
        }
    }
}

/// What a one-time code is being verified for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    /// Ordinary phone sign-in.
    #[default]
    Sms,
    /// Confirming a new phone number for an existing user.
    PhoneChange,
}

impl OtpType {
    /// Wire name of the verification type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::PhoneChange => "phone_change",
        }
    }
}

impl std::str::FromStr for OtpType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sms" => Ok(Self::Sms),
            "phone_change" => Ok(Self::PhoneChange),
            other => Err(ValidationError::InvalidOtpType(other.to_string())),
        }
    }
}
