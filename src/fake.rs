//! In-memory `BillingApi` that records the calls made against it.

use std::cell::{Cell, RefCell};

use reqwest::StatusCode;

use crate::billing::LineItem;
use crate::error::RunError;
use crate::stripe::{BillingApi, Customer, Invoice, InvoiceItem, NewCustomer};

pub const INVOICE_ID: &str = "in_fake";
pub const PDF_URL: &str = "https://files.stripe.test/in_fake.pdf";
pub const PDF_BYTES: &[u8] = b"%PDF-1.7 fake";

pub struct FakeApi {
    calls: RefCell<Vec<String>>,
    existing_customer: Option<String>,
    /// Retrievals that come back without a PDF, `None` for never ready.
    pdf_after: Option<u32>,
    retrieved: Cell<u32>,
    number: Option<String>,
    fail_on: Option<&'static str>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            existing_customer: None,
            pdf_after: Some(0),
            retrieved: Cell::new(0),
            number: Some("FAKE-0001".to_string()),
            fail_on: None,
        }
    }

    pub fn with_existing_customer(mut self, id: &str) -> Self {
        self.existing_customer = Some(id.to_string());
        self
    }

    pub fn with_pdf_after(mut self, misses: u32) -> Self {
        self.pdf_after = Some(misses);
        self
    }

    pub fn without_pdf(mut self) -> Self {
        self.pdf_after = None;
        self
    }

    pub fn without_number(mut self) -> Self {
        self.number = None;
        self
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &'static str, detail: String) -> Result<(), RunError> {
        self.calls
            .borrow_mut()
            .push(format!("{} {}", operation, detail));
        if self.fail_on == Some(operation) {
            return Err(RunError::Api {
                status: StatusCode::BAD_REQUEST,
                kind: "invalid_request_error".to_string(),
                message: format!("{} rejected", operation),
            });
        }
        Ok(())
    }

    fn invoice(&self, status: &str, pdf: bool) -> Invoice {
        let finalized = status != "draft";
        Invoice {
            id: INVOICE_ID.to_string(),
            number: self.number.clone().filter(|_| finalized),
            status: Some(status.to_string()),
            invoice_pdf: pdf.then(|| PDF_URL.to_string()),
            hosted_invoice_url: None,
            created: Some(1718445600),
            amount_due: Some(125_000),
            currency: Some("usd".to_string()),
        }
    }
}

impl BillingApi for FakeApi {
    fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Customer>, RunError> {
        self.record("find_customer", email.to_string())?;
        Ok(self.existing_customer.as_ref().map(|id| Customer {
            id: id.clone(),
            email: Some(email.to_string()),
            name: None,
        }))
    }

    fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Customer, RunError> {
        self.record("create_customer", customer.name.clone())?;
        Ok(Customer {
            id: "cus_created".to_string(),
            email: Some(customer.email.clone()),
            name: Some(customer.name.clone()),
        })
    }

    fn create_invoice(
        &self,
        customer_id: &str,
        template_id: &str,
    ) -> Result<Invoice, RunError> {
        self.record(
            "create_invoice",
            format!("{} {}", customer_id, template_id),
        )?;
        Ok(self.invoice("draft", false))
    }

    fn create_invoice_item(
        &self,
        customer_id: &str,
        invoice_id: &str,
        item: &LineItem,
    ) -> Result<InvoiceItem, RunError> {
        self.record(
            "create_invoice_item",
            format!(
                "{} {} {} {}",
                invoice_id,
                item.amount.cents(),
                item.amount.currency().code(),
                item.description
            ),
        )?;
        Ok(InvoiceItem {
            id: "ii_fake".to_string(),
            amount: item.amount.cents(),
            currency: item.amount.currency().code().to_string(),
            description: Some(format!("{} for {}", item.description, customer_id)),
        })
    }

    fn finalize_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.record("finalize", invoice_id.to_string())?;
        Ok(self.invoice("open", false))
    }

    fn send_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.record("send", invoice_id.to_string())?;
        Ok(self.invoice("open", false))
    }

    fn retrieve_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.record("retrieve", invoice_id.to_string())?;
        let misses = self.retrieved.get();
        self.retrieved.set(misses + 1);
        let ready = self.pdf_after.map_or(false, |after| misses >= after);
        Ok(self.invoice("open", ready))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, RunError> {
        self.record("download", url.to_string())?;
        Ok(PDF_BYTES.to_vec())
    }
}
