//! Fixed prices in minor currency units.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the currency's smallest unit (e.g. cents for USD).
///
/// Prices are defined server-side only; nothing in the request path ever
/// constructs one from client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in minor units.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Price {
    /// Create a new price from minor units.
    #[must_use]
    pub const fn from_minor(amount_minor: i64, currency: CurrencyCode) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Amount in the currency's standard unit (e.g. dollars).
    #[must_use]
    pub fn major_amount(&self) -> Decimal {
        Decimal::new(self.amount_minor, self.currency.minor_unit_digits())
    }

    /// Format for display (e.g. "$49.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.major_amount())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    USD,
    CAD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Lowercase code as used by the payment processor API.
    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::CAD => "cad",
            Self::EUR => "eur",
            Self::GBP => "gbp",
        }
    }

    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Number of decimal digits in one major unit.
    #[must_use]
    pub const fn minor_unit_digits(self) -> u32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_minor_units() {
        assert_eq!(Price::from_minor(4900, CurrencyCode::USD).display(), "$49.00");
        assert_eq!(Price::from_minor(125_050, CurrencyCode::USD).display(), "$1250.50");
        assert_eq!(Price::from_minor(5, CurrencyCode::GBP).display(), "£0.05");
    }

    #[test]
    fn test_major_amount() {
        let price = Price::from_minor(1999, CurrencyCode::CAD);
        assert_eq!(price.major_amount(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_api_codes_are_lowercase() {
        assert_eq!(CurrencyCode::USD.as_api_str(), "usd");
        assert_eq!(CurrencyCode::EUR.as_api_str(), "eur");
    }
}
