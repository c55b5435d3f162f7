//! Shipping address validation.

use serde::{Deserialize, Serialize};

/// Required length of a phone number, in digits.
pub const PHONE_DIGITS: usize = 10;

/// Required length of a postal code, in digits.
pub const POSTAL_CODE_DIGITS: usize = 6;

/// Why a shipping address was rejected.
///
/// The display strings are shown to shoppers as-is.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,
    #[error("Please enter a valid 6-digit pincode")]
    InvalidPostalCode,
}

/// Delivery address captured at checkout and embedded in the order.
///
/// Stored in camelCase. Checkout input also accepts the snake_case names used
/// by the rest of the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    #[serde(alias = "address_line1")]
    pub address_line1: String,
    #[serde(
        default,
        alias = "address_line2",
        skip_serializing_if = "Option::is_none"
    )]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(rename = "pincode", alias = "postal_code")]
    pub postal_code: String,
}

impl ShippingAddress {
    /// Check the address, reporting the first violated rule.
    ///
    /// Rules are checked in order: all required fields present, phone is
    /// exactly ten digits, postal code is exactly six digits. Surrounding
    /// whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns the [`AddressError`] for the first rule that fails.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            &self.name,
            &self.phone,
            &self.address_line1,
            &self.city,
            &self.state,
            &self.postal_code,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AddressError::MissingFields);
        }
        if !is_digits(self.phone.trim(), PHONE_DIGITS) {
            return Err(AddressError::InvalidPhone);
        }
        if !is_digits(self.postal_code.trim(), POSTAL_CODE_DIGITS) {
            return Err(AddressError::InvalidPostalCode);
        }
        Ok(())
    }

    /// Copy of the address with whitespace trimmed and an empty second line dropped.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self
                .address_line2
                .as_deref()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        }
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}
