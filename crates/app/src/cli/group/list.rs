use cohort_app::context::AppContext;
use tabled::builder::Builder;

use crate::cli::render_table;

pub(crate) async fn run(ctx: &AppContext) -> Result<(), String> {
    let groups = ctx
        .groups
        .list_groups()
        .await
        .map_err(|error| format!("failed to list groups: {error}"))?;

    if groups.is_empty() {
        println!("no groups found");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Description", "Users"]);

    for group in groups {
        let users = ctx
            .assignments
            .users_in_group(group.id)
            .await
            .map_err(|error| format!("failed to count users of group {}: {error}", group.id))?;

        builder.push_record([
            group.id.to_string(),
            group.name,
            group.description,
            users.len().to_string(),
        ]);
    }

    println!("{}", render_table(builder, 3..4));

    Ok(())
}
