use clap::{Args, Subcommand};
use cohort_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct MaintenanceCommand {
    #[command(subcommand)]
    command: MaintenanceSubcommand,
}

#[derive(Debug, Subcommand)]
enum MaintenanceSubcommand {
    /// Remove assignments and rule links that point at deleted rows
    Cleanup,
}

pub(crate) async fn run(ctx: &AppContext, command: MaintenanceCommand) -> Result<(), String> {
    match command.command {
        MaintenanceSubcommand::Cleanup => {
            let cleanup = ctx
                .maintenance
                .cleanup_orphans()
                .await
                .map_err(|error| format!("failed to clean up orphaned rows: {error}"))?;

            println!("assignments_removed: {}", cleanup.assignments);
            println!("product_links_removed: {}", cleanup.product_links);
            println!("category_links_removed: {}", cleanup.category_links);
            println!("total_removed: {}", cleanup.total());

            Ok(())
        }
    }
}
