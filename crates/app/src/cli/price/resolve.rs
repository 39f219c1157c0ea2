use clap::Args;
use cohort::{
    catalog::ProductId,
    groups::UserId,
    pricing::{PriceAdjustment, base_price},
};
use cohort_app::{context::AppContext, domain::resolution::PricingRequest};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::Money;

#[derive(Debug, Args)]
pub(crate) struct ResolvePriceArgs {
    #[arg(long)]
    product: ProductId,

    /// Shopper; 0 prices as a guest
    #[arg(long, default_value_t = UserId::GUEST)]
    user: UserId,

    /// Regular price in major units of the store currency
    #[arg(long)]
    regular: Decimal,

    /// Sale price; used instead of the regular price whenever it is above zero
    #[arg(long)]
    sale: Option<Decimal>,

    /// Upper end of a variable product's price range
    #[arg(long)]
    max: Option<Decimal>,

    /// Instant to resolve at (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(ctx: &AppContext, args: ResolvePriceArgs) -> Result<(), String> {
    let at = args.at.unwrap_or_else(Timestamp::now);
    let mut request = PricingRequest::new(at);

    let regular = Money::from_decimal(args.regular, ctx.currency);
    let sale = args.sale.map(|sale| Money::from_decimal(sale, ctx.currency));
    let base = base_price(regular, sale);

    if let Some(max) = args.max {
        let max = Money::from_decimal(max, ctx.currency);
        let (low, high) = ctx
            .resolver
            .resolve_variable_price_range(&mut request, args.product, args.user, base, max)
            .await;

        print_adjustment("min", &low);
        print_adjustment("max", &high);

        return Ok(());
    }

    let adjustment = ctx
        .resolver
        .resolve_price(&mut request, args.product, args.user, base)
        .await;

    print_adjustment("price", &adjustment);

    Ok(())
}

fn print_adjustment(label: &str, adjustment: &PriceAdjustment) {
    println!(
        "{label}_rule: {}",
        adjustment.rule.map_or_else(|| "none".to_string(), |rule| rule.to_string())
    );
    println!("{label}_original: {}", adjustment.original);
    println!("{label}_adjusted: {}", adjustment.adjusted);

    if adjustment.clamped {
        println!("{label}_clamped: true");
    }
}
