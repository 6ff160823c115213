use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Stripe API key required. Set STRIPE_API_KEY env var or use --api-key")]
    MissingApiKey,

    #[error("Invoice template ID required. Set STRIPE_508_INVOICE_TEMPLATE env var or use --template")]
    MissingTemplate,

    #[error("Invoice item required. Set STRIPE_508_INVOICE_ITEM env var or use --item")]
    MissingItem,

    #[error("Price required. Set STRIPE_508_INVOICE_PRICE env var or use --price")]
    MissingPrice,

    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: &'static str },

    #[error("Unknown currency '{code}', expected one of: usd, cad, eur")]
    UnknownCurrency { code: String },

    #[error("Poll attempts must be at least 1")]
    NoPollAttempts,

    #[error("{message} ({kind}, HTTP {status})")]
    Api {
        status: StatusCode,
        kind: String,
        message: String,
    },

    #[error("Request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: HTTP {status}")]
    Download { url: String, status: StatusCode },

    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Could not write {}: {source}", path.display())]
    Save { path: PathBuf, source: io::Error },

    #[error("Timeout waiting for PDF generation of {invoice} after {attempts} attempts")]
    Timeout { invoice: String, attempts: u32 },

    #[error("Invoice {invoice} has a PDF but no invoice number")]
    MissingInvoiceNumber { invoice: String },
}

impl RunError {
    /// Errors reported by the Stripe API itself, as opposed to local or
    /// transport failures.
    pub fn is_vendor(&self) -> bool {
        matches!(self, RunError::Api { .. })
    }
}
