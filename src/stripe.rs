use std::time::Duration;

use chrono::{DateTime, Utc};
use const_format::formatcp;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::billing::LineItem;
use crate::error::RunError;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const USER_AGENT: &str = formatcp!("{}/{}", NAME, VERSION);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type Params = Vec<(&'static str, String)>;

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub status: Option<String>,
    pub invoice_pdf: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub created: Option<i64>,
    pub amount_due: Option<i64>,
    pub currency: Option<String>,
}

impl Invoice {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct InvoiceItem {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct List<T> {
    data: Vec<T>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Address {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub tax_exempt: String,
    pub address: Address,
}

/// The remote operations needed to issue one invoice.
pub trait BillingApi {
    fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Customer>, RunError>;

    fn create_customer(&self, customer: &NewCustomer)
        -> Result<Customer, RunError>;

    /// Draft invoice that is not finalized automatically.
    fn create_invoice(
        &self,
        customer_id: &str,
        template_id: &str,
    ) -> Result<Invoice, RunError>;

    fn create_invoice_item(
        &self,
        customer_id: &str,
        invoice_id: &str,
        item: &LineItem,
    ) -> Result<InvoiceItem, RunError>;

    fn finalize_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError>;

    fn send_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError>;

    fn retrieve_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError>;

    fn download(&self, url: &str) -> Result<Vec<u8>, RunError>;
}

pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, RunError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        let base: String = base_url.into();
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RunError> {
        debug!("GET {}", path);
        self.execute(self.client.get(self.url(path)).query(query))
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, RunError> {
        debug!("POST {}", path);
        self.execute(self.client.post(self.url(path)).form(form))
    }

    fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RunError> {
        let response = request.bearer_auth(&self.api_key).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(response.json()?)
    }
}

impl BillingApi for StripeClient {
    fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Customer>, RunError> {
        let query = [("email", email.to_string()), ("limit", "1".to_string())];
        let list: List<Customer> = self.get("/v1/customers", &query)?;
        Ok(list.data.into_iter().next())
    }

    fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Customer, RunError> {
        self.post("/v1/customers", &customer_params(customer))
    }

    fn create_invoice(
        &self,
        customer_id: &str,
        template_id: &str,
    ) -> Result<Invoice, RunError> {
        self.post("/v1/invoices", &invoice_params(customer_id, template_id))
    }

    fn create_invoice_item(
        &self,
        customer_id: &str,
        invoice_id: &str,
        item: &LineItem,
    ) -> Result<InvoiceItem, RunError> {
        self.post(
            "/v1/invoiceitems",
            &invoice_item_params(customer_id, invoice_id, item),
        )
    }

    fn finalize_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.post(&format!("/v1/invoices/{}/finalize", invoice_id), &[])
    }

    fn send_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.post(&format!("/v1/invoices/{}/send", invoice_id), &[])
    }

    fn retrieve_invoice(&self, invoice_id: &str) -> Result<Invoice, RunError> {
        self.get(&format!("/v1/invoices/{}", invoice_id), &[])
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, RunError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RunError::Download {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn customer_params(customer: &NewCustomer) -> Params {
    vec![
        ("name", customer.name.clone()),
        ("email", customer.email.clone()),
        ("tax_exempt", customer.tax_exempt.clone()),
        ("address[line1]", customer.address.line1.clone()),
        ("address[city]", customer.address.city.clone()),
        ("address[state]", customer.address.state.clone()),
        ("address[postal_code]", customer.address.postal_code.clone()),
        ("address[country]", customer.address.country.clone()),
    ]
}

fn invoice_params(customer_id: &str, template_id: &str) -> Params {
    vec![
        ("customer", customer_id.to_string()),
        ("auto_advance", "false".to_string()),
        ("rendering[template]", template_id.to_string()),
    ]
}

fn invoice_item_params(
    customer_id: &str,
    invoice_id: &str,
    item: &LineItem,
) -> Params {
    vec![
        ("customer", customer_id.to_string()),
        ("invoice", invoice_id.to_string()),
        ("amount", item.amount.cents().to_string()),
        ("currency", item.amount.currency().code().to_string()),
        ("description", item.description.clone()),
    ]
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> RunError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let kind = match (error.kind, error.code) {
                (Some(kind), Some(code)) => format!("{}: {}", kind, code),
                (Some(kind), None) => kind,
                (None, Some(code)) => code,
                (None, None) => "api_error".to_string(),
            };
            let mut message =
                error.message.unwrap_or_else(|| "no message".to_string());
            if let Some(param) = error.param {
                message = format!("{} [param: {}]", message, param);
            }
            RunError::Api {
                status,
                kind,
                message,
            }
        }
        Err(_) => RunError::Api {
            status,
            kind: "api_error".to_string(),
            message: body.trim().to_string(),
        },
    }
}
