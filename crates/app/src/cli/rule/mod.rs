use clap::{Args, Subcommand};
use cohort::{
    catalog::{CategoryId, ProductId},
    discounts::DiscountType,
    groups::GroupId,
};
use cohort_app::{context::AppContext, domain::rules::records::RuleRecord};
use jiff::Timestamp;
use rust_decimal::Decimal;

mod conflicts;
mod create;
mod delete;
mod list;
mod reorder;
mod schedule;
mod show;
mod toggle;
mod update;

#[derive(Debug, Args)]
pub(crate) struct RuleCommand {
    #[command(subcommand)]
    command: RuleSubcommand,
}

#[derive(Debug, Subcommand)]
enum RuleSubcommand {
    Create(create::CreateRuleArgs),
    Update(update::UpdateRuleArgs),
    Schedule(schedule::ScheduleRuleArgs),
    Toggle(toggle::ToggleRuleArgs),
    ToggleAll(toggle::ToggleAllRulesArgs),
    Reorder(reorder::ReorderRulesArgs),
    Delete(delete::DeleteRuleArgs),
    DeleteAll(delete::DeleteAllRulesArgs),
    Show(show::ShowRuleArgs),
    List,
    Conflicts,
}

/// Fields shared by `create` and `update`.
#[derive(Debug, Args)]
pub(crate) struct RuleFieldArgs {
    /// Customer group the rule applies to
    #[arg(long)]
    group: GroupId,

    /// `percentage` or `fixed`
    #[arg(long = "type")]
    discount_type: DiscountType,

    /// Percent off, or amount off in major currency units
    #[arg(long)]
    value: Decimal,

    /// Products the rule targets, comma separated
    #[arg(long = "product", value_delimiter = ',')]
    products: Vec<ProductId>,

    /// Categories the rule targets, comma separated
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<CategoryId>,
}

pub(crate) async fn run(ctx: &AppContext, command: RuleCommand) -> Result<(), String> {
    match command.command {
        RuleSubcommand::Create(args) => create::run(ctx, args).await,
        RuleSubcommand::Update(args) => update::run(ctx, args).await,
        RuleSubcommand::Schedule(args) => schedule::run(ctx, args).await,
        RuleSubcommand::Toggle(args) => toggle::run(ctx, args).await,
        RuleSubcommand::ToggleAll(args) => toggle::run_all(ctx, args).await,
        RuleSubcommand::Reorder(args) => reorder::run(ctx, args).await,
        RuleSubcommand::Delete(args) => delete::run(ctx, args).await,
        RuleSubcommand::DeleteAll(args) => delete::run_all(ctx, args).await,
        RuleSubcommand::Show(args) => show::run(ctx, args).await,
        RuleSubcommand::List => list::run(ctx).await,
        RuleSubcommand::Conflicts => conflicts::run(ctx).await,
    }
}

fn print_rule(record: &RuleRecord, now: Timestamp) {
    let rule = &record.rule;

    println!("rule_id: {}", rule.id);
    println!("group_id: {}", rule.group);
    println!("discount: {} {}", rule.discount_value, rule.discount_type);
    println!("products: {}", super::join_ids(&record.products));
    println!("categories: {}", super::join_ids(&record.categories));
    println!("active: {}", rule.is_active);
    println!("schedule: {}", rule.schedule.status(now).as_str());
    println!(
        "starts_at: {}",
        rule.schedule.start().map_or_else(|| "-".to_string(), |at| at.to_string())
    );
    println!(
        "ends_at: {}",
        rule.schedule.end().map_or_else(|| "-".to_string(), |at| at.to_string())
    );
    println!("sort_order: {}", rule.sort_order);
    println!("created_at: {}", rule.created_at);
}
