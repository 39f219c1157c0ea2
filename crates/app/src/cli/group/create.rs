use clap::Args;
use cohort_app::{context::AppContext, domain::groups::data::NewGroup};

#[derive(Debug, Args)]
pub(crate) struct CreateGroupArgs {
    /// Group display name
    #[arg(long)]
    name: String,

    /// Free-form description
    #[arg(long, default_value = "")]
    description: String,
}

pub(crate) async fn run(ctx: &AppContext, args: CreateGroupArgs) -> Result<(), String> {
    let group = ctx
        .groups
        .create_group(NewGroup {
            name: args.name,
            description: args.description,
        })
        .await
        .map_err(|error| format!("failed to create group: {error}"))?;

    println!("group_id: {}", group.id);
    println!("group_name: {}", group.name);

    Ok(())
}
