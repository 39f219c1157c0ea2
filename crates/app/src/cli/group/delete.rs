use clap::Args;
use cohort::groups::GroupId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct DeleteGroupArgs {
    /// Group to delete along with its rules and user assignments
    #[arg(long)]
    id: GroupId,
}

pub(crate) async fn run(ctx: &AppContext, args: DeleteGroupArgs) -> Result<(), String> {
    let deletion = ctx
        .groups
        .delete_group(args.id)
        .await
        .map_err(|error| format!("failed to delete group {}: {error}", args.id))?;

    println!("deleted group {}", args.id);
    println!("rules_removed: {}", deletion.rules);
    println!("assignments_removed: {}", deletion.assignments);

    Ok(())
}
