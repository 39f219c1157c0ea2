use clap::{Args, Subcommand};
use cohort_app::context::AppContext;

mod create;
mod delete;
mod list;

#[derive(Debug, Args)]
pub(crate) struct GroupCommand {
    #[command(subcommand)]
    command: GroupSubcommand,
}

#[derive(Debug, Subcommand)]
enum GroupSubcommand {
    Create(create::CreateGroupArgs),
    List,
    Delete(delete::DeleteGroupArgs),
}

pub(crate) async fn run(ctx: &AppContext, command: GroupCommand) -> Result<(), String> {
    match command.command {
        GroupSubcommand::Create(args) => create::run(ctx, args).await,
        GroupSubcommand::List => list::run(ctx).await,
        GroupSubcommand::Delete(args) => delete::run(ctx, args).await,
    }
}
