use clap::{Args, Subcommand};
use cohort_app::context::AppContext;

mod resolve;
mod title;

#[derive(Debug, Args)]
pub(crate) struct PriceCommand {
    #[command(subcommand)]
    command: PriceSubcommand,
}

#[derive(Debug, Subcommand)]
enum PriceSubcommand {
    Resolve(resolve::ResolvePriceArgs),
    Title(title::GroupTitleArgs),
}

pub(crate) async fn run(ctx: &AppContext, command: PriceCommand) -> Result<(), String> {
    match command.command {
        PriceSubcommand::Resolve(args) => resolve::run(ctx, args).await,
        PriceSubcommand::Title(args) => title::run(ctx, args).await,
    }
}
