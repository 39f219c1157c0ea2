use cohort_app::context::AppContext;
use jiff::Timestamp;
use tabled::builder::Builder;

use crate::cli::{join_ids, render_table};

pub(crate) async fn run(ctx: &AppContext) -> Result<(), String> {
    let records = ctx
        .rules
        .list_rules()
        .await
        .map_err(|error| format!("failed to list rules: {error}"))?;

    if records.is_empty() {
        println!("no rules found");
        return Ok(());
    }

    let now = Timestamp::now();
    let mut builder = Builder::default();

    builder.push_record([
        "Order",
        "ID",
        "Group",
        "Type",
        "Value",
        "Products",
        "Categories",
        "Active",
        "Schedule",
    ]);

    for record in records {
        let rule = &record.rule;

        builder.push_record([
            rule.sort_order.to_string(),
            rule.id.to_string(),
            rule.group.to_string(),
            rule.discount_type.to_string(),
            rule.discount_value.to_string(),
            join_ids(&record.products),
            join_ids(&record.categories),
            if rule.is_active { "yes" } else { "no" }.to_string(),
            rule.schedule.status(now).as_str().to_string(),
        ]);
    }

    println!("{}", render_table(builder, 0..2));

    Ok(())
}
