use clap::{Parser, ValueHint};
use std::path::PathBuf;

/* Argument Stucture
 *
 * stripe-invoice --item <name> --price <amount> --template <id>
 *      [--customer <id>] [--send-email] [--dir <path>] [--prefix <text>]
 *      [--currency <code>] [--api-key <key>]
 *
 * Every value falls back to an environment variable. Required values are
 * optional here so a missing one is reported with its env var name.
 */

#[derive(Parser, Debug, Default)]
#[command(
    name = "stripe-invoice",
    version,
    about = "Generate a Stripe invoice and download its PDF"
)]
pub struct Opts {
    /// Name of the invoice item
    #[arg(long, env = "STRIPE_508_INVOICE_ITEM")]
    pub item: Option<String>,

    /// Price of the item, e.g. 1250 or 1250.50
    #[arg(long, env = "STRIPE_508_INVOICE_PRICE")]
    pub price: Option<String>,

    /// Directory to save the PDF in
    #[arg(long, env = "STRIPE_508_INVOICE_DIR", default_value = ".",
        value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Filename prefix [default: "508.dev <username> Invoice-"]
    #[arg(long, env = "STRIPE_508_INVOICE_PREFIX")]
    pub prefix: Option<String>,

    /// Stripe customer id, the 508.dev LLC customer is found or created
    /// when not given
    #[arg(long, env = "STRIPE_508_INVOICE_CUSTOMER")]
    pub customer: Option<String>,

    /// Invoice rendering template id
    #[arg(long, env = "STRIPE_508_INVOICE_TEMPLATE")]
    pub template: Option<String>,

    /// Email the finalized invoice to the customer
    #[arg(long, env = "STRIPE_508_INVOICE_SEND_EMAIL",
        value_parser = clap::builder::BoolishValueParser::new())]
    pub send_email: bool,

    /// Stripe API key
    #[arg(long = "api-key", alias = "api_key", env = "STRIPE_API_KEY",
        hide_env_values = true)]
    pub api_key: Option<String>,

    /// Currency of the item price
    #[arg(long, env = "STRIPE_508_INVOICE_CURRENCY", default_value = "usd")]
    pub currency: String,

    /// Base URL of the Stripe API
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com",
        value_hint = ValueHint::Url)]
    pub api_base: String,

    /// Number of times to check for the rendered PDF
    #[arg(long, default_value_t = 30)]
    pub poll_attempts: u32,

    /// Seconds to wait between checks for the rendered PDF
    #[arg(long, default_value_t = 2)]
    pub poll_interval: u64,

    /// Log request details
    #[arg(short, long)]
    pub verbose: bool,
}
