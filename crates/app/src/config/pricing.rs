//! Pricing Config

use clap::Args;
use cohort::{
    groups::GroupId,
    pricing::{UnknownCurrency, parse_currency},
    validation::{DEFAULT_FIXED_CEILING, RuleValidator},
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;

use crate::domain::resolution::PricingSettings;

/// Pricing settings.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Group applied to shoppers without an explicit assignment
    #[arg(long, env = "DEFAULT_GROUP_ID", global = true)]
    pub default_group_id: Option<i64>,

    /// Label shown to default-group shoppers instead of the group name
    #[arg(long, env = "DEFAULT_GROUP_TITLE", global = true)]
    pub default_group_title: Option<String>,

    /// ISO code of the store currency
    #[arg(long, env = "STORE_CURRENCY", default_value = "USD", global = true)]
    pub store_currency: String,

    /// Largest fixed discount a rule may carry, in major units
    #[arg(long, env = "FIXED_DISCOUNT_CEILING", default_value_t = DEFAULT_FIXED_CEILING, global = true)]
    pub fixed_discount_ceiling: Decimal,
}

impl PricingConfig {
    #[must_use]
    pub fn default_group(&self) -> Option<GroupId> {
        self.default_group_id.map(GroupId::new)
    }

    /// The store currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not a supported currency.
    pub fn currency(&self) -> Result<&'static Currency, UnknownCurrency> {
        parse_currency(&self.store_currency)
    }

    #[must_use]
    pub fn validator(&self) -> RuleValidator {
        RuleValidator::new(self.fixed_discount_ceiling)
    }

    /// Resolver settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the store currency is not supported.
    pub fn settings(&self) -> Result<PricingSettings, UnknownCurrency> {
        Ok(PricingSettings {
            default_group: self.default_group(),
            default_group_title: self
                .default_group_title
                .as_deref()
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string),
            currency: self.currency()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        pricing: PricingConfig,
    }

    #[test]
    fn defaults_apply_without_arguments() -> TestResult {
        let harness = Harness::try_parse_from(["cohort-app"])?;

        assert_eq!(harness.pricing.fixed_discount_ceiling, DEFAULT_FIXED_CEILING);
        assert_eq!(harness.pricing.default_group(), None);

        Ok(())
    }

    #[test]
    fn settings_trim_blank_titles() -> TestResult {
        let harness = Harness::try_parse_from([
            "cohort-app",
            "--default-group-id",
            "2",
            "--default-group-title",
            "   ",
            "--store-currency",
            "gbp",
        ])?;

        let settings = harness.pricing.settings()?;

        assert_eq!(settings.default_group, Some(GroupId::new(2)));
        assert_eq!(settings.default_group_title, None);
        assert_eq!(settings.currency, GBP);

        Ok(())
    }

    #[test]
    fn unsupported_currency_is_rejected() -> TestResult {
        let harness = Harness::try_parse_from(["cohort-app", "--store-currency", "XYZ"])?;

        assert!(harness.pricing.currency().is_err());

        Ok(())
    }
}
