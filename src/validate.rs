//! Request Validation
//! Mission: Check inbound payloads field by field and collect every violation

use crate::auth::models::RegisterRequest;
use crate::shipping::models::{CreateShippingRequest, NewShippingOrder};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration payload with every field present and trimmed
#[derive(Debug)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub telephone_number: String,
}

/// Trim a field, recording the message when it is missing or blank
fn required(value: &Option<String>, message: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(message.to_string());
            None
        }
    }
}

/// Loose shape check: one `@`, non-empty local part, dotted domain
fn is_email_shaped(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Validate a registration payload, returning all violations at once
pub fn validate_registration(req: &RegisterRequest) -> Result<ValidRegistration, Vec<String>> {
    let mut errors = Vec::new();

    let first_name = required(&req.first_name, "First name is required", &mut errors);
    let last_name = required(&req.last_name, "Last name is required", &mut errors);
    let address = required(&req.address, "Address is required", &mut errors);

    let email = match required(&req.email, "Email is required", &mut errors) {
        Some(e) if is_email_shaped(&e) => Some(e),
        Some(_) => {
            errors.push("Enter a valid email".to_string());
            None
        }
        None => None,
    };

    let telephone_number = match required(
        &req.telephone_number,
        "Phone number is required",
        &mut errors,
    ) {
        Some(t) if t.chars().all(|c| c.is_ascii_digit()) => Some(t),
        Some(_) => {
            errors.push("Phone number is not valid".to_string());
            None
        }
        None => None,
    };

    let password = match required(&req.password, "Password is required", &mut errors) {
        Some(p) if p.len() >= MIN_PASSWORD_LENGTH => Some(p),
        Some(_) => {
            errors.push("Password should be of minimum 8 characters length".to_string());
            None
        }
        None => None,
    };

    match (
        first_name,
        last_name,
        email,
        password,
        address,
        telephone_number,
    ) {
        (Some(first_name), Some(last_name), Some(email), Some(password), Some(address), Some(telephone_number))
            if errors.is_empty() =>
        {
            Ok(ValidRegistration {
                first_name,
                last_name,
                email,
                password,
                address,
                telephone_number,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a lone email field (forgot-password)
pub fn validate_email_field(email: Option<&str>) -> Result<String, String> {
    match email.map(str::trim) {
        Some(e) if e.is_empty() => Err("Email is required".to_string()),
        Some(e) if is_email_shaped(e) => Ok(e.to_string()),
        Some(_) => Err("Enter a valid email".to_string()),
        None => Err("Email is required".to_string()),
    }
}

/// Validate a lone password field (reset-password)
pub fn validate_password_field(password: Option<&str>) -> Result<String, String> {
    match password {
        Some(p) if p.is_empty() => Err("Password is required".to_string()),
        Some(p) if p.len() >= MIN_PASSWORD_LENGTH => Ok(p.to_string()),
        Some(_) => Err("Password should be of minimum 8 characters length".to_string()),
        None => Err("Password is required".to_string()),
    }
}

/// Coerce the weight field, which clients send as a number or a string
fn parse_weight(value: &serde_json::Value) -> Result<f64, String> {
    let invalid = || "Weight must be a positive number".to_string();
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(w) if w > 0.0 => Ok(w),
        _ => Err(invalid()),
    }
}

/// Validate a shipping-order payload, returning all violations at once
pub fn validate_shipping(req: &CreateShippingRequest) -> Result<NewShippingOrder, Vec<String>> {
    let mut errors = Vec::new();

    let first_name = required(&req.first_name, "First name is required", &mut errors);
    let last_name = required(&req.last_name, "Last name is required", &mut errors);
    let address = required(&req.address, "Address is required", &mut errors);
    let city = required(&req.city, "City is required", &mut errors);
    let postal_code = required(&req.postal_code, "Postal code is required", &mut errors);
    let description = required(&req.description, "Description is required", &mut errors);

    let weight_missing = match &req.weight {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => true,
        Some(_) => false,
    };
    let weight = if weight_missing {
        errors.push("Weight is required".to_string());
        None
    } else {
        match parse_weight(req.weight.as_ref().unwrap_or(&serde_json::Value::Null)) {
            Ok(w) => Some(w),
            Err(msg) => {
                errors.push(msg);
                None
            }
        }
    };

    match (
        first_name,
        last_name,
        address,
        city,
        postal_code,
        description,
        weight,
    ) {
        (Some(first_name), Some(last_name), Some(address), Some(city), Some(postal_code), Some(description), Some(weight))
            if errors.is_empty() =>
        {
            Ok(NewShippingOrder {
                first_name,
                last_name,
                address,
                city,
                postal_code,
                description,
                weight,
            })
        }
        _ => Err(errors),
    }
}
