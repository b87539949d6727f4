//! Field format checks for shipment input. Shared by the create path and the
//! CLI so rejects happen before anything touches the store.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::WaybillError;
use crate::shipment::types::{NewShipment, PackageInfo, Party};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const ADDRESS_MIN: usize = 5;
const ADDRESS_MAX: usize = 200;
const MAX_WEIGHT_KG: f64 = 1_000.0;

/// Digits with optional leading `+` and common separators, 7 to 20 characters.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9(][0-9 ()\-]{5,18}[0-9]$").expect("valid phone regex")
});

pub fn validate_phone(label: &str, phone: &str) -> Result<(), WaybillError> {
    if !PHONE_PATTERN.is_match(phone.trim()) {
        return Err(WaybillError::validation(format!(
            "{label} phone number is not a valid format"
        )));
    }
    Ok(())
}

pub fn validate_party(label: &str, party: &Party) -> Result<(), WaybillError> {
    let name = party.name.trim();
    if name.len() < NAME_MIN || name.len() > NAME_MAX {
        return Err(WaybillError::validation(format!(
            "{label} name must be {NAME_MIN}-{NAME_MAX} characters"
        )));
    }
    let address = party.address.trim();
    if address.len() < ADDRESS_MIN || address.len() > ADDRESS_MAX {
        return Err(WaybillError::validation(format!(
            "{label} address must be {ADDRESS_MIN}-{ADDRESS_MAX} characters"
        )));
    }
    validate_phone(label, &party.phone)?;
    Ok(())
}

pub fn validate_package(package: &PackageInfo) -> Result<(), WaybillError> {
    if package.description.trim().is_empty() {
        return Err(WaybillError::validation("package description is required"));
    }
    if !(package.weight_kg > 0.0 && package.weight_kg <= MAX_WEIGHT_KG) {
        return Err(WaybillError::validation(format!(
            "package weight must be between 0 and {MAX_WEIGHT_KG} kg"
        )));
    }
    if let Some(value) = package.declared_value {
        if value < 0.0 {
            return Err(WaybillError::validation(
                "declared value cannot be negative",
            ));
        }
    }
    Ok(())
}

pub fn validate_new_shipment(req: &NewShipment) -> Result<(), WaybillError> {
    validate_party("sender", &req.sender)?;
    validate_party("recipient", &req.recipient)?;
    validate_package(&req.package)?;
    Ok(())
}
