//! End-to-end resolution over the seeded pricing fixture.
//!
//! All evaluations happen at 2025-06-15T12:00:00Z unless stated otherwise. Users 7
//! and 8 belong to the wholesale group; everyone else is unassigned.

use cohort::{
    catalog::ProductId,
    fixtures::Fixture,
    groups::UserId,
    pricing::{Price, base_price},
    rules::{RuleId, RuleSource},
};
use jiff::Timestamp;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use crate::{
    domain::{
        resolution::{PricingRequest, PricingResolver, PricingSettings},
        rules::RulesService,
    },
    seed::SeedReport,
    test::TestContext,
};

const WHOLESALE_USER: UserId = UserId::new(7);
const UNASSIGNED_USER: UserId = UserId::new(42);

fn now() -> Result<Timestamp, jiff::Error> {
    "2025-06-15T12:00:00Z".parse()
}

fn usd(minor: i64) -> Price {
    Money::from_minor(minor, USD)
}

/// Base price for a fixture product, sale price first.
fn price_of(fixture: &Fixture, key: &str) -> Result<Price, Box<dyn std::error::Error>> {
    let (regular, sale) = fixture.product_prices(key)?;

    Ok(base_price(regular, sale))
}

/// Store id of the n-th fixture rule, counting from one.
fn rule(report: &SeedReport, n: usize) -> Result<RuleId, String> {
    report
        .rules
        .get(n - 1)
        .copied()
        .ok_or_else(|| format!("fixture has no rule {n}"))
}

struct Scenario {
    ctx: TestContext,
    fixture: Fixture,
    report: SeedReport,
}

impl Scenario {
    async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let ctx = TestContext::new().await;
        let report = ctx.seed_fixture().await?;

        Ok(Self {
            ctx,
            fixture: TestContext::fixture(),
            report,
        })
    }

    fn resolver(&self, default_group: Option<&str>) -> Result<PricingResolver, Box<dyn std::error::Error>> {
        let default_group = default_group.map(|key| self.report.group(key)).transpose()?;

        Ok(self.ctx.resolver(PricingSettings {
            default_group,
            default_group_title: None,
            currency: USD,
        }))
    }

    fn product(&self, key: &str) -> Result<ProductId, Box<dyn std::error::Error>> {
        Ok(self.fixture.product_id(key)?)
    }
}

#[tokio::test]
async fn fixed_category_rule_beats_percentages_across_ancestors() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;
    let tee = scenario.product("tee")?;

    let resolved = resolver
        .resolve_rule(tee, WHOLESALE_USER, now()?)
        .await?
        .ok_or("expected a rule")?;

    // Both fixed rules are $5; the apparel one was created later.
    assert_eq!(resolved.rule.id, rule(&scenario.report, 4)?);
    assert_eq!(resolved.source, RuleSource::Category);

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(&mut request, tee, WHOLESALE_USER, price_of(&scenario.fixture, "tee")?)
        .await;

    assert_eq!(adjustment.adjusted, usd(1500));
    assert_eq!(adjustment.rule, Some(resolved.rule.id));

    Ok(())
}

#[tokio::test]
async fn product_rule_overrides_category_rules() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;
    let polo = scenario.product("polo")?;

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(&mut request, polo, WHOLESALE_USER, price_of(&scenario.fixture, "polo")?)
        .await;

    assert_eq!(adjustment.rule, Some(rule(&scenario.report, 5)?));
    assert_eq!(adjustment.adjusted, usd(2910));

    Ok(())
}

#[tokio::test]
async fn variation_rule_is_preferred_over_the_parent_rule() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;

    let small = resolver
        .resolve_rule(scenario.product("polo-small")?, WHOLESALE_USER, now()?)
        .await?
        .ok_or("expected a rule")?;

    let medium = resolver
        .resolve_rule(scenario.product("polo-medium")?, WHOLESALE_USER, now()?)
        .await?
        .ok_or("expected a rule")?;

    assert_eq!(small.rule.id, rule(&scenario.report, 6)?);
    assert_eq!(medium.rule.id, rule(&scenario.report, 5)?);
    assert_eq!(medium.source, RuleSource::Product);

    Ok(())
}

#[tokio::test]
async fn equal_percentages_go_to_the_most_recent_rule() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(
            &mut request,
            scenario.product("mug")?,
            WHOLESALE_USER,
            price_of(&scenario.fixture, "mug")?,
        )
        .await;

    assert_eq!(adjustment.rule, Some(rule(&scenario.report, 8)?));
    assert_eq!(adjustment.adjusted, usd(680));

    Ok(())
}

#[tokio::test]
async fn oversized_fixed_discount_clamps_to_zero() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(
            &mut request,
            scenario.product("sticker")?,
            WHOLESALE_USER,
            price_of(&scenario.fixture, "sticker")?,
        )
        .await;

    assert_eq!(adjustment.adjusted, usd(0));
    assert!(adjustment.clamped);

    Ok(())
}

#[tokio::test]
async fn expired_rule_leaves_the_price_alone() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;
    let lamp = scenario.product("lamp")?;

    assert_eq!(resolver.resolve_rule(lamp, WHOLESALE_USER, now()?).await?, None);

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(&mut request, lamp, WHOLESALE_USER, price_of(&scenario.fixture, "lamp")?)
        .await;

    assert_eq!(adjustment.adjusted, usd(5000));
    assert_eq!(adjustment.rule, None);

    Ok(())
}

#[tokio::test]
async fn scheduled_rule_applies_once_started_and_inactive_rule_never() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;
    let wreath = scenario.product("wreath")?;
    let later: Timestamp = "2025-06-17T00:00:00Z".parse()?;

    assert_eq!(resolver.resolve_rule(wreath, WHOLESALE_USER, now()?).await?, None);

    let resolved = resolver
        .resolve_rule(wreath, WHOLESALE_USER, later)
        .await?
        .ok_or("expected a rule")?;

    assert_eq!(resolved.rule.id, rule(&scenario.report, 11)?);

    Ok(())
}

#[tokio::test]
async fn sale_price_is_the_base_for_the_discount() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(None)?;

    let mut request = PricingRequest::new(now()?);
    let adjustment = resolver
        .resolve_price(
            &mut request,
            scenario.product("hoodie")?,
            WHOLESALE_USER,
            price_of(&scenario.fixture, "hoodie")?,
        )
        .await;

    assert_eq!(adjustment.original, usd(3000));
    assert_eq!(adjustment.adjusted, usd(2500));

    Ok(())
}

#[tokio::test]
async fn unassigned_users_fall_back_to_the_default_group() -> TestResult {
    let scenario = Scenario::new().await?;
    let scarf = scenario.product("scarf")?;
    let base = price_of(&scenario.fixture, "scarf")?;

    let without_default = scenario.resolver(None)?;
    let with_default = scenario.resolver(Some("retail"))?;

    assert_eq!(without_default.resolve_rule(scarf, UNASSIGNED_USER, now()?).await?, None);

    let mut request = PricingRequest::new(now()?);

    for user in [UNASSIGNED_USER, UserId::GUEST] {
        let adjustment = with_default.resolve_price(&mut request, scarf, user, base).await;

        assert_eq!(adjustment.rule, Some(rule(&scenario.report, 13)?));
        assert_eq!(adjustment.adjusted, usd(1080));
    }

    // Assigned users keep their own group even when a default exists.
    let wholesale = with_default.resolve_price(&mut request, scarf, WHOLESALE_USER, base).await;

    assert_eq!(wholesale.rule, None);

    Ok(())
}

#[tokio::test]
async fn display_title_follows_assignment_then_default_group() -> TestResult {
    let scenario = Scenario::new().await?;
    let resolver = scenario.resolver(Some("retail"))?;

    assert_eq!(
        resolver.display_group_title(WHOLESALE_USER, now()?).await?,
        Some("Wholesale".to_string())
    );
    assert_eq!(
        resolver.display_group_title(UNASSIGNED_USER, now()?).await?,
        Some("Retail".to_string())
    );
    assert_eq!(scenario.resolver(None)?.display_group_title(UNASSIGNED_USER, now()?).await?, None);

    Ok(())
}

#[tokio::test]
async fn switched_off_fixture_rules_are_stored_inactive() -> TestResult {
    let scenario = Scenario::new().await?;

    let scheduled = scenario.ctx.rules.get_rule(rule(&scenario.report, 11)?).await?;
    let switched_off = scenario.ctx.rules.get_rule(rule(&scenario.report, 12)?).await?;

    assert!(scheduled.rule.is_active);
    assert!(!switched_off.rule.is_active);

    Ok(())
}
