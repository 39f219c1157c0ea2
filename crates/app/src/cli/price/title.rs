use clap::Args;
use cohort::groups::UserId;
use cohort_app::context::AppContext;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct GroupTitleArgs {
    /// Shopper; 0 for a guest
    #[arg(long, default_value_t = UserId::GUEST)]
    user: UserId,
}

pub(crate) async fn run(ctx: &AppContext, args: GroupTitleArgs) -> Result<(), String> {
    let title = ctx
        .resolver
        .display_group_title(args.user, Timestamp::now())
        .await
        .map_err(|error| format!("failed to resolve group title for user {}: {error}", args.user))?;

    match title {
        Some(title) => println!("{title}"),
        None => println!("no group title"),
    }

    Ok(())
}
