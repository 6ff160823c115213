use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::billing::{Currency, Money};
use crate::clients;
use crate::config::Settings;
use crate::error::RunError;
use crate::invoices;
use crate::stripe::{BillingApi, Invoice};

/// What a successful run leaves behind.
#[derive(Debug, PartialEq, Clone)]
pub struct Outcome {
    pub invoice_id: String,
    pub number: String,
    pub path: PathBuf,
    pub created: Option<DateTime<Utc>>,
    pub amount_due: Option<Money>,
    pub hosted_url: Option<String>,
}

impl Outcome {
    fn new(invoice: Invoice, number: String, path: PathBuf, currency: Currency) -> Self {
        let currency = invoice
            .currency
            .as_deref()
            .and_then(|code| Currency::from_str(code).ok())
            .unwrap_or(currency);
        Self {
            created: invoice.created_at(),
            amount_due: invoice
                .amount_due
                .map(|cents| Money::from_cents(currency, cents)),
            invoice_id: invoice.id,
            number,
            path,
            hosted_url: invoice.hosted_invoice_url,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Invoice PDF saved as: {}", self.path.display())?;
        writeln!(f, "Invoice ID: {}", self.invoice_id)?;
        write!(f, "Invoice Number: {}", self.number)?;
        if let Some(created) = self.created {
            write!(f, "\nInvoice Date: {}", created.date_naive())?;
        }
        if let Some(amount) = self.amount_due {
            write!(f, "\nAmount Due: {}", amount)?;
        }
        if let Some(url) = &self.hosted_url {
            write!(f, "\nPayment Page: {}", url)?;
        }
        Ok(())
    }
}

/// Create, finalize and optionally send one invoice, then download its PDF.
pub fn run(settings: &Settings, api: &impl BillingApi) -> Result<Outcome, RunError> {
    let customer_id = clients::resolve(api, settings.customer_id.as_deref())?;

    info!("Creating invoice with template {}...", settings.template_id);
    let draft = api.create_invoice(&customer_id, &settings.template_id)?;
    debug!("Created draft invoice {}", draft.id);

    info!("Creating invoice item: {}", settings.item);
    let item = api.create_invoice_item(&customer_id, &draft.id, &settings.item)?;
    debug!(
        "Created invoice item {}: {} {} {}",
        item.id,
        item.description.as_deref().unwrap_or(""),
        item.amount,
        item.currency
    );

    info!("Finalizing invoice...");
    let finalized = api.finalize_invoice(&draft.id)?;
    debug!(
        "Invoice {} is {}",
        finalized.id,
        finalized.status.as_deref().unwrap_or("unknown")
    );

    if settings.send_email {
        info!("Sending invoice email to customer...");
        api.send_invoice(&finalized.id)?;
    }

    let invoice = invoices::await_document(api, &finalized.id, &settings.poll)?;
    let (url, number) = match (&invoice.invoice_pdf, &invoice.number) {
        (Some(url), Some(number)) => (url.clone(), number.clone()),
        _ => {
            return Err(RunError::MissingInvoiceNumber {
                invoice: invoice.id,
            })
        }
    };

    info!("PDF ready! Downloading from: {}", url);
    let bytes = api.download(&url)?;
    let path =
        invoices::save_document(&settings.dir, &settings.prefix, &number, &bytes)?;

    Ok(Outcome::new(
        invoice,
        number,
        path,
        settings.item.amount.currency(),
    ))
}
