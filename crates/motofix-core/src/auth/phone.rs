//! Phone number and one-time code parsing

use crate::error::{MotofixError, MotofixResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phone number in E.164 form (`+<country><subscriber>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse user input, rewriting local numbers with `default_country_code`
    ///
    /// Accepts `+256 700 000 000`, `256700000000`, `0700-000-000` (with country
    /// code `256`) and similar. Separators (spaces, dashes, dots, parentheses)
    /// are ignored.
    pub fn parse(input: &str, default_country_code: &str) -> MotofixResult<Self> {
        let trimmed = input.trim();
        let has_plus = trimmed.starts_with('+');
        let body = if has_plus { &trimmed[1..] } else { trimmed };

        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => {
                    return Err(MotofixError::invalid_field(
                        "phone",
                        format!("'{}' is not a valid phone number", input.trim()),
                    ));
                }
            }
        }

        let normalized = if has_plus {
            digits
        } else if let Some(local) = digits.strip_prefix('0') {
            format!("{}{}", default_country_code, local)
        } else if digits.starts_with(default_country_code) {
            digits
        } else {
            format!("{}{}", default_country_code, digits)
        };

        if !(9..=15).contains(&normalized.len()) {
            return Err(MotofixError::invalid_field(
                "phone",
                format!("'{}' is not a valid phone number", input.trim()),
            ));
        }

        Ok(Self(format!("+{}", normalized)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-time code as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    pub fn parse(input: &str) -> MotofixResult<Self> {
        let code: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if !(4..=8).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(MotofixError::invalid_field(
                "code",
                "The code should be 4 to 8 digits",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
