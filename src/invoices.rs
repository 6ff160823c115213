use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::RunError;
use crate::stripe::{BillingApi, Invoice};

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Retrieve the invoice until Stripe has rendered its PDF, giving up after
/// `policy.attempts` retrievals.
pub fn await_document(
    api: &impl BillingApi,
    invoice_id: &str,
    policy: &PollPolicy,
) -> Result<Invoice, RunError> {
    info!("Waiting for PDF to be generated...");
    for attempt in 1..=policy.attempts {
        let invoice = api.retrieve_invoice(invoice_id)?;
        if invoice.invoice_pdf.is_some() {
            return Ok(invoice);
        }
        debug!("No PDF yet, attempt {} of {}", attempt, policy.attempts);
        if attempt < policy.attempts {
            thread::sleep(policy.interval);
        }
    }
    Err(RunError::Timeout {
        invoice: invoice_id.to_string(),
        attempts: policy.attempts,
    })
}

pub fn document_path(dir: &Path, prefix: &str, number: &str) -> PathBuf {
    dir.join(format!("{}{}.pdf", prefix, number))
}

/// Write the PDF under `dir`, creating it if needed. The bytes go to a
/// `.part` file first so the final name only ever holds a complete document.
pub fn save_document(
    dir: &Path,
    prefix: &str,
    number: &str,
    bytes: &[u8],
) -> Result<PathBuf, RunError> {
    let path = document_path(dir, prefix, number);
    let partial = path.with_extension("pdf.part");
    let saving = |source| RunError::Save {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(saving)?;
    let mut f = File::create(&partial).map_err(saving)?;
    f.write_all(bytes).map_err(saving)?;
    f.sync_all().map_err(saving)?;
    fs::rename(&partial, &path).map_err(saving)?;

    Ok(path)
}
