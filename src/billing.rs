use std::fmt;
use std::str::FromStr;

use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use strum_macros::{Display, EnumString};

use crate::error::RunError;

#[derive(
    Display,
    EnumString,
    Debug,
    PartialEq,
    Clone,
    Copy,
    Default,
)]
#[strum(ascii_case_insensitive)]
pub enum Currency {
    #[default]
    #[strum(to_string = "USD $", serialize = "usd")]
    Usd,
    #[strum(to_string = "CAD $", serialize = "cad")]
    Cad,
    #[strum(to_string = "EUR €", serialize = "eur")]
    Eur,
}

impl Currency {
    /// Lowercase ISO code as the Stripe API expects it.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Cad => "cad",
            Currency::Eur => "eur",
        }
    }
}

/// An amount in the currency's minor unit.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Money(Currency, i64);

impl Money {
    pub fn from_cents(currency: Currency, cents: i64) -> Self {
        Self(currency, cents)
    }

    pub fn currency(&self) -> Currency {
        self.0
    }

    pub fn cents(&self) -> i64 {
        self.1
    }
}

/// Parse a price such as `1250` or `1250.50` into cents. Amounts finer than
/// a cent are rejected rather than truncated.
pub fn parse_cents(price: &str) -> Result<i64, RunError> {
    let invalid = |reason| RunError::InvalidPrice {
        value: price.to_string(),
        reason,
    };

    let value =
        Decimal::from_str(price.trim()).map_err(|_| invalid("not a number"))?;
    if value <= Decimal::ZERO {
        return Err(invalid("must be greater than zero"));
    }
    if value.normalize().scale() > 2 {
        return Err(invalid("more than two decimal places"));
    }

    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.to_i64())
        .ok_or_else(|| invalid("too large"))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.1 < 0 { "-" } else { "" };
        let abs = self.1.unsigned_abs();
        write!(
            f,
            "{}{}{}.{:02}",
            self.0,
            sign,
            (abs / 100).to_formatted_string(&Locale::en),
            abs % 100
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct LineItem {
    pub description: String,
    pub amount: Money,
}

impl LineItem {
    pub fn new(description: String, amount: Money) -> Self {
        Self {
            description,
            amount,
        }
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.description, self.amount)
    }
}
