use cohort_app::{context::AppContext, domain::rules::records::ConflictScope};
use tabled::builder::Builder;

use crate::cli::{join_ids, render_table};

pub(crate) async fn run(ctx: &AppContext) -> Result<(), String> {
    let conflicts = ctx
        .rules
        .rule_conflicts()
        .await
        .map_err(|error| format!("failed to find rule conflicts: {error}"))?;

    if conflicts.is_empty() {
        println!("no conflicting rules");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Group", "Target", "Rules"]);

    for conflict in conflicts {
        let target = match conflict.scope {
            ConflictScope::Product(product) => format!("product {product}"),
            ConflictScope::Category(category) => format!("category {category}"),
        };

        builder.push_record([conflict.group.to_string(), target, join_ids(&conflict.rules)]);
    }

    println!("{}", render_table(builder, 0..1));

    Ok(())
}
