/*
 * Issue a single Stripe invoice and keep a copy of its PDF.
 *
 * Steps:
 *  - Resolve flags and their environment fallbacks
 *  - Find the customer to bill
 *      - Default: the 508.dev LLC customer, created if it doesn't exist
 *  - Create a draft invoice rendered with the given template
 *  - Attach one line item and finalize the invoice
 *  - Email the invoice if asked to
 *  - Wait for Stripe to render the PDF, then save it as
 *    <dir>/<prefix><invoice number>.pdf
 */

mod billing;
mod cli;
mod clients;
mod config;
mod error;
mod invoices;
mod run;
mod stripe;

#[cfg(test)]
mod fake;

use std::process;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::Opts;
use crate::config::Settings;
use crate::error::RunError;
use crate::stripe::StripeClient;

fn main() {
    let opts = Opts::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { FAILURE } else { 0 };
        let _ = e.print();
        process::exit(code);
    });
    init_logging(opts.verbose);

    if let Err(error) = issue(opts) {
        eprintln!("{}", report(&error));
        process::exit(FAILURE);
    }
}

const FAILURE: i32 = 1;

fn report(error: &RunError) -> String {
    if error.is_vendor() {
        format!("Stripe error: {}", error)
    } else {
        format!("Error: {}", error)
    }
}

fn issue(opts: Opts) -> Result<(), RunError> {
    let settings = Settings::resolve(opts, &config::username())?;
    let api = StripeClient::new(settings.api_key.as_str(), settings.api_base.as_str())?;
    let outcome = run::run(&settings, &api)?;
    println!("{}", outcome);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Could not initialize logging: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn missing_key_fails_before_any_request() {
        let opts = Opts::try_parse_from([
            "stripe-invoice",
            "--api-key",
            "",
            "--template",
            "inrtem_1",
        ])
        .unwrap();
        match issue(opts) {
            Err(error) => assert_eq!(
                report(&error),
                "Error: Stripe API key required. Set STRIPE_API_KEY env var or use --api-key"
            ),
            Ok(()) => panic!("run without an API key should fail"),
        }
    }

    #[test]
    fn stripe_errors_are_labelled() {
        let error = RunError::Api {
            status: StatusCode::UNAUTHORIZED,
            kind: "invalid_request_error".to_string(),
            message: "Invalid API Key provided".to_string(),
        };
        assert!(report(&error).starts_with("Stripe error: Invalid API Key provided"));
    }

    #[test]
    fn timeout_is_a_plain_error() {
        let error = RunError::Timeout {
            invoice: "in_1".to_string(),
            attempts: 30,
        };
        assert_eq!(
            report(&error),
            "Error: Timeout waiting for PDF generation of in_1 after 30 attempts"
        );
        assert_eq!(FAILURE, 1);
    }
}
