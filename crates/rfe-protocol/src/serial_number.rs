//! Device serial numbers (`#Sn` messages)

use std::fmt::Display;

use crate::error::ParseError;

/// A device serial number: 16 alphanumeric characters
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct SerialNumber(String);

const SERIAL_NUMBER_LEN: usize = 16;

impl SerialNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn parse_body(body: &str) -> Result<Self, ParseError> {
        if body.len() != SERIAL_NUMBER_LEN || !body.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidFrame(format!(
                "bad serial number: {body:?}"
            )));
        }
        Ok(SerialNumber(body.to_string()))
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_valid_serial_number() {
        let sn = SerialNumber::parse_body("B3AK7AL7CACAA74M").unwrap();
        assert_eq!(sn.as_str(), "B3AK7AL7CACAA74M");
    }

    #[test]
    fn test_reject_wrong_length() {
        assert!(SerialNumber::parse_body("SHORT").is_err());
    }

    #[test]
    fn test_reject_non_alphanumeric() {
        assert!(SerialNumber::parse_body("B3AK7AL7CACAA74-").is_err());
    }
}
