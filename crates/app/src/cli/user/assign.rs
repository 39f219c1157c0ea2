use clap::Args;
use cohort::groups::{GroupId, UserId};
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct AssignUsersArgs {
    /// Users to move into the group, comma separated
    #[arg(long = "user", value_delimiter = ',', required = true)]
    users: Vec<UserId>,

    /// Target group
    #[arg(long)]
    group: GroupId,
}

pub(crate) async fn run(ctx: &AppContext, args: AssignUsersArgs) -> Result<(), String> {
    let assigned = ctx
        .assignments
        .assign_users(args.users, args.group)
        .await
        .map_err(|error| format!("failed to assign users: {error}"))?;

    println!("assigned {assigned} user(s) to group {}", args.group);

    Ok(())
}
