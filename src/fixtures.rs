//! Fixtures
//!
//! YAML descriptions of a catalog, customer groups, user assignments and pricing
//! rules. Catalog entries carry the external ids they are known by; groups and rules
//! are referenced by key and given store ids when seeded.

use std::{fs, path::Path, str::FromStr};

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Category, CategoryId, Product, ProductId},
    discounts::DiscountType,
    groups::UserId,
    pricing::{Price, UnknownCurrency, parse_currency},
    schedule::{Schedule, ScheduleError},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid discount value
    #[error("Invalid discount value: {0}")]
    InvalidDiscount(String),

    /// Unknown currency code
    #[error(transparent)]
    UnknownCurrency(#[from] UnknownCurrency),

    /// Price currency differs from the fixture currency
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Unknown product key
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Unknown category key
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Unknown group key
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Rule schedule is inverted
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Category Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFixture {
    /// External category id
    pub id: i64,

    /// Parent category key
    #[serde(default)]
    pub parent: Option<String>,

    /// Display name, defaults to the key
    #[serde(default)]
    pub name: Option<String>,
}

/// Product Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFixture {
    /// External product id
    pub id: i64,

    /// Parent product key, for variations
    #[serde(default)]
    pub parent: Option<String>,

    /// Category keys
    #[serde(default)]
    pub categories: Vec<String>,

    /// Regular price (e.g., "19.99 USD")
    #[serde(default)]
    pub price: Option<String>,

    /// Sale price (e.g., "14.99 USD")
    #[serde(default)]
    pub sale_price: Option<String>,
}

/// Group Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct GroupFixture {
    /// Display name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,
}

/// Rule Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFixture {
    /// Group key
    pub group: String,

    /// `percentage` or `fixed`
    #[serde(rename = "type")]
    pub discount_type: DiscountType,

    /// Discount value (e.g., "15" or "5.00")
    pub value: String,

    /// Product keys
    #[serde(default)]
    pub products: Vec<String>,

    /// Category keys
    #[serde(default)]
    pub categories: Vec<String>,

    /// Schedule start
    #[serde(default)]
    pub start: Option<Timestamp>,

    /// Schedule end
    #[serde(default)]
    pub end: Option<Timestamp>,

    /// Active flag
    #[serde(default = "active_by_default")]
    pub active: bool,

    /// Creation instant override, for tie-break scenarios
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

const fn active_by_default() -> bool {
    true
}

/// A rule with every key resolved to an id, apart from its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    /// Group key
    pub group: String,

    /// Discount type
    pub discount_type: DiscountType,

    /// Discount value
    pub discount_value: Decimal,

    /// Products the rule applies to
    pub products: Vec<ProductId>,

    /// Categories the rule applies to
    pub categories: Vec<CategoryId>,

    /// Activation window
    pub schedule: Schedule,

    /// Active flag
    pub is_active: bool,

    /// Creation instant override
    pub created_at: Option<Timestamp>,
}

/// Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// ISO currency code prices are given in
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Map of category key -> category fixture
    #[serde(default)]
    pub categories: FxHashMap<String, CategoryFixture>,

    /// Map of product key -> product fixture
    #[serde(default)]
    pub products: FxHashMap<String, ProductFixture>,

    /// Map of group key -> group fixture
    #[serde(default)]
    pub groups: FxHashMap<String, GroupFixture>,

    /// Map of group key -> assigned user ids
    #[serde(default)]
    pub assignments: FxHashMap<String, Vec<i64>>,

    /// Pricing rules
    #[serde(default)]
    pub rules: Vec<RuleFixture>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl FromStr for Fixture {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_norway::from_str(s)?)
    }
}

impl Fixture {
    /// Load a fixture from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        fs::read_to_string(path)?.parse()
    }

    /// Fixture currency
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        Ok(parse_currency(&self.currency)?)
    }

    /// Look up a product id by key
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] for unknown keys.
    pub fn product_id(&self, key: &str) -> Result<ProductId, FixtureError> {
        self.products
            .get(key)
            .map(|product| ProductId::new(product.id))
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Look up a category id by key
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CategoryNotFound`] for unknown keys.
    pub fn category_id(&self, key: &str) -> Result<CategoryId, FixtureError> {
        self.categories
            .get(key)
            .map(|category| CategoryId::new(category.id))
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Catalog categories, ordered by id
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CategoryNotFound`] if a parent key is unknown.
    pub fn catalog_categories(&self) -> Result<Vec<Category>, FixtureError> {
        let mut categories = self
            .categories
            .iter()
            .map(|(key, fixture)| {
                Ok(Category {
                    id: CategoryId::new(fixture.id),
                    parent: fixture.parent.as_deref().map(|parent| self.category_id(parent)).transpose()?,
                    name: fixture.name.clone().unwrap_or_else(|| key.clone()),
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        categories.sort_by_key(|category| category.id);

        Ok(categories)
    }

    /// Catalog products, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if a parent or category key is unknown.
    pub fn catalog_products(&self) -> Result<Vec<Product>, FixtureError> {
        let mut products = self
            .products
            .values()
            .map(|fixture| {
                Ok(Product {
                    id: ProductId::new(fixture.id),
                    parent: fixture.parent.as_deref().map(|parent| self.product_id(parent)).transpose()?,
                    categories: fixture
                        .categories
                        .iter()
                        .map(|key| self.category_id(key))
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        products.sort_by_key(|product| product.id);

        Ok(products)
    }

    /// Regular and sale price of a product
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, missing or malformed prices, or prices in a
    /// currency other than the fixture's.
    pub fn product_prices(&self, key: &str) -> Result<(Price, Option<Price>), FixtureError> {
        let product = self
            .products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))?;

        let regular = product
            .price
            .as_deref()
            .ok_or_else(|| FixtureError::InvalidPrice(format!("{key} has no price")))?;

        let regular = self.price(regular)?;
        let sale = product.sale_price.as_deref().map(|sale| self.price(sale)).transpose()?;

        Ok((regular, sale))
    }

    fn price(&self, s: &str) -> Result<Price, FixtureError> {
        let (minor_units, currency) = parse_price(s)?;
        let expected = self.currency()?;

        if currency != expected {
            return Err(FixtureError::CurrencyMismatch(
                expected.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }

        Ok(Money::from_minor(minor_units, currency))
    }

    /// Group keys with their user ids, ordered by key
    pub fn user_assignments(&self) -> Vec<(&str, Vec<UserId>)> {
        let mut assignments: Vec<_> = self
            .assignments
            .iter()
            .map(|(group, users)| (group.as_str(), users.iter().copied().map(UserId::new).collect()))
            .collect();

        assignments.sort_by_key(|(group, _)| *group);

        assignments
    }

    /// Rules with product and category keys resolved, in document order
    ///
    /// # Errors
    ///
    /// Returns an error for unknown group, product or category keys, malformed
    /// values, or inverted schedules.
    pub fn rule_definitions(&self) -> Result<Vec<RuleDefinition>, FixtureError> {
        self.rules
            .iter()
            .map(|rule| {
                if !self.groups.contains_key(&rule.group) {
                    return Err(FixtureError::GroupNotFound(rule.group.clone()));
                }

                let discount_value = rule
                    .value
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_err| FixtureError::InvalidDiscount(rule.value.clone()))?;

                Ok(RuleDefinition {
                    group: rule.group.clone(),
                    discount_type: rule.discount_type,
                    discount_value,
                    products: rule
                        .products
                        .iter()
                        .map(|key| self.product_id(key))
                        .collect::<Result<_, _>>()?,
                    categories: rule
                        .categories
                        .iter()
                        .map(|key| self.category_id(key))
                        .collect::<Result<_, _>>()?,
                    schedule: Schedule::new(rule.start, rule.end)?,
                    is_active: rule.active,
                    created_at: rule.created_at,
                })
            })
            .collect()
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount is not a decimal, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(code)?;

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| amount.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
