use tracing::info;

use crate::error::RunError;
use crate::stripe::{Address, BillingApi, NewCustomer};

pub const DEFAULT_EMAIL: &str = "billing@508.dev";

/// The customer invoices are addressed to when no customer id is given.
pub fn default_customer() -> NewCustomer {
    NewCustomer {
        name: "508.dev LLC".to_string(),
        email: DEFAULT_EMAIL.to_string(),
        tax_exempt: "exempt".to_string(),
        address: Address {
            line1: "2376 Gemini St".to_string(),
            city: "Houston".to_string(),
            state: "TX".to_string(),
            postal_code: "77058".to_string(),
            country: "US".to_string(),
        },
    }
}

/// Customer id to bill: the given one, else the default customer found by
/// email, else a newly created default customer.
pub fn resolve(
    api: &impl BillingApi,
    customer_id: Option<&str>,
) -> Result<String, RunError> {
    if let Some(id) = customer_id {
        info!("Using customer: {}", id);
        return Ok(id.to_string());
    }

    let customer = default_customer();
    info!("Looking for {} customer...", customer.name);
    if let Some(found) = api.find_customer_by_email(&customer.email)? {
        info!(
            "Found existing customer: {} ({} <{}>)",
            found.id,
            found.name.as_deref().unwrap_or("unnamed"),
            found.email.as_deref().unwrap_or(&customer.email)
        );
        return Ok(found.id);
    }

    info!("Creating new {} customer...", customer.name);
    let created = api.create_customer(&customer)?;
    info!("Created new customer: {}", created.id);
    Ok(created.id)
}
