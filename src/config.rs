use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::billing::{self, Currency, LineItem, Money};
use crate::cli::Opts;
use crate::error::RunError;
use crate::invoices::PollPolicy;

const USERNAME_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// Everything a run needs, validated.
#[derive(Debug, PartialEq, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub template_id: String,
    pub customer_id: Option<String>,
    pub item: LineItem,
    pub dir: PathBuf,
    pub prefix: String,
    pub send_email: bool,
    pub poll: PollPolicy,
}

impl Settings {
    pub fn resolve(opts: Opts, username: &str) -> Result<Self, RunError> {
        let api_key = present(opts.api_key).ok_or(RunError::MissingApiKey)?;
        let template_id =
            present(opts.template).ok_or(RunError::MissingTemplate)?;
        let description = present(opts.item).ok_or(RunError::MissingItem)?;
        let price = present(opts.price).ok_or(RunError::MissingPrice)?;
        let cents = billing::parse_cents(&price)?;

        let currency = Currency::from_str(opts.currency.trim()).map_err(|_| {
            RunError::UnknownCurrency {
                code: opts.currency.clone(),
            }
        })?;
        let amount = Money::from_cents(currency, cents);

        if opts.poll_attempts == 0 {
            return Err(RunError::NoPollAttempts);
        }

        Ok(Self {
            api_key,
            api_base: opts.api_base,
            template_id,
            customer_id: present(opts.customer),
            item: LineItem::new(description, amount),
            dir: expand_home(&opts.dir, dirs::home_dir().as_deref()),
            prefix: opts.prefix.unwrap_or_else(|| default_prefix(username)),
            send_email: opts.send_email,
            poll: PollPolicy {
                attempts: opts.poll_attempts,
                interval: Duration::from_secs(opts.poll_interval),
            },
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn default_prefix(username: &str) -> String {
    format!("508.dev {} Invoice-", username)
}

/// Login name from the environment, checked in the same order as `getpass`.
pub fn username() -> String {
    USERNAME_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "user".to_string())
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
