use clap::Args;
use cohort::groups::UserId;
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct ShowUserArgs {
    #[arg(long)]
    user: UserId,
}

pub(crate) async fn run(ctx: &AppContext, args: ShowUserArgs) -> Result<(), String> {
    let group = ctx
        .assignments
        .user_group(args.user)
        .await
        .map_err(|error| format!("failed to look up user {}: {error}", args.user))?;

    let Some(group) = group else {
        println!("user {} is not assigned to a group", args.user);
        return Ok(());
    };

    let group = ctx
        .groups
        .get_group(group)
        .await
        .map_err(|error| format!("failed to load group {group}: {error}"))?;

    println!("user_id: {}", args.user);
    println!("group_id: {}", group.id);
    println!("group_name: {}", group.name);

    Ok(())
}
