//! Pricing resolution service.

use std::sync::Arc;

use cohort::{
    catalog::ProductId,
    groups::{GroupId, UserId},
    precedence::select_winner,
    pricing::{Price, PriceAdjustment, apply_rule},
    rules::{ResolvedRule, RuleSource},
    schedule::to_millisecond_precision,
};
use jiff::Timestamp;
use rusty_money::iso::Currency;
use tracing::{Span, debug, error};

use crate::domain::resolution::{
    candidates::RuleCandidateFetcher,
    errors::{ResolutionError, StoreError},
    hierarchy::CategoryHierarchyResolver,
    request::PricingRequest,
    store::{Catalog, GroupDirectory, RuleStore},
};

/// Shop-wide pricing configuration.
#[derive(Debug, Clone)]
pub struct PricingSettings {
    /// Group used for shoppers without an explicit assignment.
    pub default_group: Option<GroupId>,

    /// Label shown instead of the default group's name.
    pub default_group_title: Option<String>,

    /// Currency prices are quoted in.
    pub currency: &'static Currency,
}

/// Resolves the rule and price that apply to a shopper and product.
#[derive(Clone)]
pub struct PricingResolver {
    groups: Arc<dyn GroupDirectory>,
    rules: Arc<dyn RuleStore>,
    catalog: Arc<dyn Catalog>,
    hierarchy: CategoryHierarchyResolver,
    candidates: RuleCandidateFetcher,
    settings: PricingSettings,
}

impl std::fmt::Debug for PricingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PricingResolver {
    #[must_use]
    pub fn new(
        groups: Arc<dyn GroupDirectory>,
        rules: Arc<dyn RuleStore>,
        catalog: Arc<dyn Catalog>,
        settings: PricingSettings,
    ) -> Self {
        Self {
            groups,
            hierarchy: CategoryHierarchyResolver::new(Arc::clone(&catalog)),
            candidates: RuleCandidateFetcher::new(Arc::clone(&rules)),
            rules,
            catalog,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    /// The user's assigned group, or the default group when there is none. Guests
    /// never have an assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment cannot be read.
    pub async fn effective_group(&self, user: UserId) -> Result<Option<GroupId>, StoreError> {
        if user == UserId::GUEST {
            return Ok(self.settings.default_group);
        }

        Ok(self.groups.user_group(user).await?.or(self.settings.default_group))
    }

    /// The single rule that applies to `product` for `user` at `at`.
    ///
    /// A product rule wins outright and category rules are not fetched. Otherwise the
    /// best eligible rule across the product's categories and their ancestors wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or catalog cannot be read.
    #[tracing::instrument(
        name = "resolution.resolve_rule",
        skip(self),
        fields(group_id = tracing::field::Empty, rule_id = tracing::field::Empty),
        err
    )]
    pub async fn resolve_rule(
        &self,
        product: ProductId,
        user: UserId,
        at: Timestamp,
    ) -> Result<Option<ResolvedRule>, ResolutionError> {
        let at = to_millisecond_precision(at);

        let Some(group) = self.effective_group(user).await? else {
            return Ok(None);
        };

        Span::current().record("group_id", tracing::field::display(group));

        let parent = self.catalog.product_parent(product).await?;
        let candidates = RuleCandidateFetcher::candidate_products(product, parent);

        if let Some(rule) = self.candidates.product_rule(&candidates, group, at).await? {
            Span::current().record("rule_id", tracing::field::display(rule.id));

            return Ok(Some(ResolvedRule {
                rule,
                source: RuleSource::Product,
            }));
        }

        let categories = self.hierarchy.resolve_with_parent(product, parent).await?;
        let rules = self.candidates.category_rules(&categories, group, at).await?;

        debug!(categories = categories.len(), candidates = rules.len(), "fetched category rules");

        let resolved = select_winner(&rules).cloned().map(|rule| ResolvedRule {
            rule,
            source: RuleSource::Category,
        });

        if let Some(resolved) = &resolved {
            Span::current().record("rule_id", tracing::field::display(resolved.rule.id));
        }

        Ok(resolved)
    }

    /// Price `product` for `user`, starting from `base`.
    ///
    /// Resolutions are memoised in `request`. Any failure is logged and the base price
    /// is returned unchanged; failures are not memoised.
    pub async fn resolve_price(
        &self,
        request: &mut PricingRequest,
        product: ProductId,
        user: UserId,
        base: Price,
    ) -> PriceAdjustment {
        match self.resolved_rule(request, product, user).await {
            Ok(resolved) => price_with(base, resolved.as_ref()),
            Err(error) => {
                error!(%product, %user, %error, "price resolution failed, using base price");

                PriceAdjustment::unchanged(base)
            }
        }
    }

    /// Price both ends of a variable product's range with one resolved rule.
    pub async fn resolve_variable_price_range(
        &self,
        request: &mut PricingRequest,
        product: ProductId,
        user: UserId,
        min: Price,
        max: Price,
    ) -> (PriceAdjustment, PriceAdjustment) {
        match self.resolved_rule(request, product, user).await {
            Ok(resolved) => (price_with(min, resolved.as_ref()), price_with(max, resolved.as_ref())),
            Err(error) => {
                error!(%product, %user, %error, "price range resolution failed, using base prices");

                (PriceAdjustment::unchanged(min), PriceAdjustment::unchanged(max))
            }
        }
    }

    /// Label for the shopper's group: the assigned group's name, or for everyone else
    /// the default group's title while that group has an eligible rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn display_group_title(&self, user: UserId, at: Timestamp) -> Result<Option<String>, ResolutionError> {
        let at = to_millisecond_precision(at);

        if user != UserId::GUEST
            && let Some(group) = self.groups.user_group(user).await?
        {
            return Ok(self.groups.group_name(group).await?);
        }

        let Some(default_group) = self.settings.default_group else {
            return Ok(None);
        };

        if !self.rules.group_has_active_rules(default_group, at).await? {
            return Ok(None);
        }

        match &self.settings.default_group_title {
            Some(title) if !title.trim().is_empty() => Ok(Some(title.clone())),
            _ => Ok(self.groups.group_name(default_group).await?),
        }
    }

    async fn resolved_rule(
        &self,
        request: &mut PricingRequest,
        product: ProductId,
        user: UserId,
    ) -> Result<Option<ResolvedRule>, ResolutionError> {
        if let Some(cached) = request.memo().get(product, user) {
            return Ok(cached.cloned());
        }

        let resolved = self.resolve_rule(product, user, request.point_in_time()).await?;

        request.memo_mut().insert(product, user, resolved.clone());

        Ok(resolved)
    }
}

fn price_with(base: Price, resolved: Option<&ResolvedRule>) -> PriceAdjustment {
    apply_rule(base, resolved.map(|resolved| &resolved.rule)).unwrap_or_else(|error| {
        error!(%error, "failed to apply pricing rule, using base price");

        PriceAdjustment::unchanged(base)
    })
}

#[cfg(test)]
mod tests {
    use cohort::{
        catalog::CategoryId,
        discounts::DiscountType,
        rules::{PricingRule, RuleId},
        schedule::Schedule,
    };
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::domain::resolution::store::{MockCatalog, MockGroupDirectory, MockRuleStore};

    use super::*;

    const WHOLESALE: GroupId = GroupId::new(1);
    const RETAIL: GroupId = GroupId::new(2);

    fn rule(id: i64, group: GroupId, discount_type: DiscountType, value: i64) -> PricingRule {
        PricingRule {
            id: RuleId::new(id),
            group,
            discount_type,
            discount_value: Decimal::new(value, 0),
            is_active: true,
            schedule: Schedule::always(),
            created_at: Timestamp::UNIX_EPOCH,
            sort_order: 0,
        }
    }

    fn settings(default_group: Option<GroupId>, title: Option<&str>) -> PricingSettings {
        PricingSettings {
            default_group,
            default_group_title: title.map(str::to_string),
            currency: USD,
        }
    }

    fn resolver(
        groups: MockGroupDirectory,
        rules: MockRuleStore,
        catalog: MockCatalog,
        settings: PricingSettings,
    ) -> PricingResolver {
        PricingResolver::new(Arc::new(groups), Arc::new(rules), Arc::new(catalog), settings)
    }

    fn usd(minor: i64) -> Price {
        Money::from_minor(minor, USD)
    }

    #[tokio::test]
    async fn product_rule_short_circuits_category_lookup() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();
        let mut catalog = MockCatalog::new();

        groups.expect_user_group().returning(|_| Ok(Some(WHOLESALE)));
        catalog.expect_product_parent().returning(|_| Ok(None));
        catalog.expect_product_categories().never();
        catalog.expect_category_ancestors().never();
        rules.expect_active_category_rules().never();

        rules
            .expect_active_product_rule()
            .withf(|products, group, _| products.to_vec() == vec![ProductId::new(100)] && *group == WHOLESALE)
            .times(1)
            .returning(|_, _, _| Ok(Some(rule(5, WHOLESALE, DiscountType::Percentage, 3))));

        let resolver = resolver(groups, rules, catalog, settings(None, None));

        let resolved = resolver
            .resolve_rule(ProductId::new(100), UserId::new(7), Timestamp::UNIX_EPOCH)
            .await?
            .ok_or("expected a rule")?;

        assert_eq!(resolved.rule.id, RuleId::new(5));
        assert_eq!(resolved.source, RuleSource::Product);

        Ok(())
    }

    #[tokio::test]
    async fn variation_candidates_include_the_parent() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();
        let mut catalog = MockCatalog::new();

        groups.expect_user_group().returning(|_| Ok(Some(WHOLESALE)));

        catalog
            .expect_product_parent()
            .with(eq(ProductId::new(111)))
            .times(1)
            .returning(|_| Ok(Some(ProductId::new(110))));

        rules
            .expect_active_product_rule()
            .withf(|products, _, _| products.to_vec() == vec![ProductId::new(111), ProductId::new(110)])
            .times(1)
            .returning(|_, _, _| Ok(Some(rule(5, WHOLESALE, DiscountType::Percentage, 3))));

        let resolver = resolver(groups, rules, catalog, settings(None, None));

        let resolved = resolver
            .resolve_rule(ProductId::new(111), UserId::new(7), Timestamp::UNIX_EPOCH)
            .await?;

        assert_eq!(resolved.map(|resolved| resolved.rule.id), Some(RuleId::new(5)));

        Ok(())
    }

    #[tokio::test]
    async fn best_category_rule_wins() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();
        let mut catalog = MockCatalog::new();

        groups.expect_user_group().returning(|_| Ok(Some(WHOLESALE)));
        catalog.expect_product_parent().returning(|_| Ok(None));
        catalog
            .expect_product_categories()
            .returning(|_| Ok(vec![CategoryId::new(11)]));
        catalog
            .expect_category_ancestors()
            .returning(|_| Ok(vec![CategoryId::new(10)]));
        rules.expect_active_product_rule().returning(|_, _, _| Ok(None));

        rules
            .expect_active_category_rules()
            .withf(|categories, _, _| categories.to_vec() == vec![CategoryId::new(11), CategoryId::new(10)])
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    rule(3, WHOLESALE, DiscountType::Percentage, 50),
                    rule(4, WHOLESALE, DiscountType::Fixed, 5),
                    rule(1, WHOLESALE, DiscountType::Percentage, 10),
                ])
            });

        let resolver = resolver(groups, rules, catalog, settings(None, None));

        let resolved = resolver
            .resolve_rule(ProductId::new(100), UserId::new(7), Timestamp::UNIX_EPOCH)
            .await?
            .ok_or("expected a rule")?;

        assert_eq!(resolved.rule.id, RuleId::new(4));
        assert_eq!(resolved.source, RuleSource::Category);

        Ok(())
    }

    #[tokio::test]
    async fn no_group_means_no_rule() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();

        groups.expect_user_group().returning(|_| Ok(None));
        rules.expect_active_product_rule().never();

        let resolver = resolver(groups, rules, MockCatalog::new(), settings(None, None));

        let resolved = resolver
            .resolve_rule(ProductId::new(100), UserId::new(42), Timestamp::UNIX_EPOCH)
            .await?;

        assert!(resolved.is_none(), "expected no rule, got {resolved:?}");

        Ok(())
    }

    #[tokio::test]
    async fn guests_use_the_default_group_without_a_lookup() -> TestResult {
        let mut groups = MockGroupDirectory::new();

        groups.expect_user_group().never();

        let resolver = resolver(groups, MockRuleStore::new(), MockCatalog::new(), settings(Some(RETAIL), None));

        assert_eq!(resolver.effective_group(UserId::GUEST).await?, Some(RETAIL));

        Ok(())
    }

    #[tokio::test]
    async fn explicit_assignment_beats_the_default_group() -> TestResult {
        let mut groups = MockGroupDirectory::new();

        groups
            .expect_user_group()
            .with(eq(UserId::new(7)))
            .returning(|_| Ok(Some(WHOLESALE)));

        let resolver = resolver(groups, MockRuleStore::new(), MockCatalog::new(), settings(Some(RETAIL), None));

        assert_eq!(resolver.effective_group(UserId::new(7)).await?, Some(WHOLESALE));

        Ok(())
    }

    #[tokio::test]
    async fn repeated_pricing_reuses_the_memo() {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();
        let mut catalog = MockCatalog::new();

        groups.expect_user_group().times(1).returning(|_| Ok(Some(WHOLESALE)));
        catalog.expect_product_parent().times(1).returning(|_| Ok(None));

        rules
            .expect_active_product_rule()
            .times(1)
            .returning(|_, _, _| Ok(Some(rule(5, WHOLESALE, DiscountType::Percentage, 10))));

        let resolver = resolver(groups, rules, catalog, settings(None, None));
        let mut request = PricingRequest::new(Timestamp::UNIX_EPOCH);

        let line = resolver
            .resolve_price(&mut request, ProductId::new(100), UserId::new(7), usd(2000))
            .await;

        let label = resolver
            .resolve_price(&mut request, ProductId::new(100), UserId::new(7), usd(2000))
            .await;

        assert_eq!(line, label);
        assert_eq!(line.adjusted, usd(1800));
        assert_eq!(request.memo().len(), 1);
    }

    #[tokio::test]
    async fn misses_are_memoised_too() {
        let mut groups = MockGroupDirectory::new();

        groups.expect_user_group().times(1).returning(|_| Ok(None));

        let resolver = resolver(groups, MockRuleStore::new(), MockCatalog::new(), settings(None, None));
        let mut request = PricingRequest::new(Timestamp::UNIX_EPOCH);

        for _ in 0..3 {
            let adjustment = resolver
                .resolve_price(&mut request, ProductId::new(100), UserId::new(42), usd(2000))
                .await;

            assert_eq!(adjustment, PriceAdjustment::unchanged(usd(2000)));
        }
    }

    #[tokio::test]
    async fn store_failures_degrade_to_base_price_and_are_retried() {
        let mut groups = MockGroupDirectory::new();

        groups
            .expect_user_group()
            .times(2)
            .returning(|_| Err(StoreError::Sql(sqlx::Error::PoolTimedOut)));

        let resolver = resolver(groups, MockRuleStore::new(), MockCatalog::new(), settings(None, None));
        let mut request = PricingRequest::new(Timestamp::UNIX_EPOCH);

        for _ in 0..2 {
            let adjustment = resolver
                .resolve_price(&mut request, ProductId::new(100), UserId::new(7), usd(2000))
                .await;

            assert_eq!(adjustment, PriceAdjustment::unchanged(usd(2000)));
        }

        assert!(request.memo().is_empty());
    }

    #[tokio::test]
    async fn price_range_applies_one_rule_to_both_ends() {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();
        let mut catalog = MockCatalog::new();

        groups.expect_user_group().times(1).returning(|_| Ok(Some(WHOLESALE)));
        catalog.expect_product_parent().times(1).returning(|_| Ok(None));

        rules
            .expect_active_product_rule()
            .times(1)
            .returning(|_, _, _| Ok(Some(rule(5, WHOLESALE, DiscountType::Fixed, 5))));

        let resolver = resolver(groups, rules, catalog, settings(None, None));
        let mut request = PricingRequest::new(Timestamp::UNIX_EPOCH);

        let (min, max) = resolver
            .resolve_variable_price_range(&mut request, ProductId::new(110), UserId::new(7), usd(300), usd(3200))
            .await;

        assert_eq!(min.adjusted, usd(0));
        assert!(min.clamped);
        assert_eq!(max.adjusted, usd(2700));
    }

    #[tokio::test]
    async fn title_uses_the_assigned_group_name() -> TestResult {
        let mut groups = MockGroupDirectory::new();

        groups.expect_user_group().returning(|_| Ok(Some(WHOLESALE)));
        groups
            .expect_group_name()
            .with(eq(WHOLESALE))
            .returning(|_| Ok(Some("Wholesale".to_string())));

        let resolver = resolver(groups, MockRuleStore::new(), MockCatalog::new(), settings(Some(RETAIL), None));

        assert_eq!(
            resolver.display_group_title(UserId::new(7), Timestamp::UNIX_EPOCH).await?,
            Some("Wholesale".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn title_for_default_group_prefers_the_custom_title() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();

        groups.expect_user_group().returning(|_| Ok(None));
        groups.expect_group_name().never();
        rules.expect_group_has_active_rules().returning(|_, _| Ok(true));

        let resolver = resolver(
            groups,
            rules,
            MockCatalog::new(),
            settings(Some(RETAIL), Some("Member price")),
        );

        assert_eq!(
            resolver.display_group_title(UserId::new(42), Timestamp::UNIX_EPOCH).await?,
            Some("Member price".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn title_is_hidden_while_the_default_group_has_no_rules() -> TestResult {
        let mut groups = MockGroupDirectory::new();
        let mut rules = MockRuleStore::new();

        groups.expect_user_group().never();
        rules
            .expect_group_has_active_rules()
            .with(eq(RETAIL), eq(Timestamp::UNIX_EPOCH))
            .returning(|_, _| Ok(false));

        let resolver = resolver(groups, rules, MockCatalog::new(), settings(Some(RETAIL), None));

        assert_eq!(resolver.display_group_title(UserId::GUEST, Timestamp::UNIX_EPOCH).await?, None);

        Ok(())
    }
}
