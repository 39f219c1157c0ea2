use clap::Args;
use cohort::groups::UserId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct UnassignUsersArgs {
    /// Users to remove from their group, comma separated
    #[arg(long = "user", value_delimiter = ',', required = true)]
    users: Vec<UserId>,
}

pub(crate) async fn run(ctx: &AppContext, args: UnassignUsersArgs) -> Result<(), String> {
    let removed = ctx
        .assignments
        .unassign_users(args.users)
        .await
        .map_err(|error| format!("failed to unassign users: {error}"))?;

    println!("unassigned {removed} user(s)");

    Ok(())
}
