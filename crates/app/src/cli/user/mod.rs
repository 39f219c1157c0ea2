use clap::{Args, Subcommand};
use cohort_app::context::AppContext;

mod assign;
mod show;
mod unassign;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    Assign(assign::AssignUsersArgs),
    Unassign(unassign::UnassignUsersArgs),
    Show(show::ShowUserArgs),
}

pub(crate) async fn run(ctx: &AppContext, command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::Assign(args) => assign::run(ctx, args).await,
        UserSubcommand::Unassign(args) => unassign::run(ctx, args).await,
        UserSubcommand::Show(args) => show::run(ctx, args).await,
    }
}
