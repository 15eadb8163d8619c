use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\d{10}$").expect("valid phone regex");
    static ref PIN_CODE_RE: Regex = Regex::new(r"^\d{6}$").expect("valid pin code regex");
}

/// Default country for new addresses; the storefront ships domestically.
pub const DEFAULT_COUNTRY: &str = "India";

/// A saved delivery address as returned by `GET /api/user/addresses`.
///
/// At most one address per user is conceptually the default; the server
/// enforces that, the client only reads the flag. Older server responses
/// spell the flag `default` instead of `isDefault`, hence the alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_id: i64,
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "isDefault", alias = "default", default)]
    pub is_default: bool,
}

/// Address form fields, validated locally before any request is sent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 1, message = "Please enter full name"))]
    pub full_name: String,

    #[validate(regex(path = "PHONE_RE", message = "Please enter valid 10-digit phone number"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Please enter address"))]
    pub address_line: String,

    #[validate(length(min = 1, message = "Please enter city"))]
    pub city: String,

    #[validate(length(min = 1, message = "Please enter state"))]
    pub state: String,

    #[validate(regex(path = "PIN_CODE_RE", message = "Please enter valid 6-digit PIN code"))]
    pub pin_code: String,

    pub country: String,

    #[serde(default)]
    pub is_default: bool,
}

impl Default for AddressInput {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            address_line: String::new(),
            city: String::new(),
            state: String::new(),
            pin_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            is_default: false,
        }
    }
}

/// Wire envelope of `GET /api/user/addresses`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressListEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::first_validation_message;

    fn valid_input() -> AddressInput {
        AddressInput {
            full_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            address_line: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pin_code: "560001".into(),
            ..AddressInput::default()
        }
    }

    #[test]
    fn valid_address_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn short_phone_rejected_with_format_message() {
        let input = AddressInput {
            phone: "12345".into(),
            ..valid_input()
        };
        let errors = input.validate().expect_err("phone must be rejected");
        assert_eq!(
            first_validation_message(&errors),
            "Please enter valid 10-digit phone number"
        );
    }

    #[test]
    fn phone_with_letters_rejected() {
        let input = AddressInput {
            phone: "98765abcde".into(),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn pin_code_must_be_six_digits() {
        for bad in ["1234", "1234567", "56000a"] {
            let input = AddressInput {
                pin_code: bad.into(),
                ..valid_input()
            };
            assert!(input.validate().is_err(), "pin {:?} should fail", bad);
        }
    }

    #[test]
    fn empty_name_rejected() {
        let input = AddressInput {
            full_name: String::new(),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn default_country_is_prefilled() {
        assert_eq!(AddressInput::default().country, "India");
    }

    #[test]
    fn accepts_legacy_default_flag_spelling() {
        let json = r#"{
            "addressId": 3,
            "fullName": "Asha Rao",
            "phone": "9876543210",
            "addressLine": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pinCode": "560001",
            "country": "India",
            "default": true
        }"#;

        let address: Address = serde_json::from_str(json).expect("address parses");
        assert!(address.is_default);
    }
}
