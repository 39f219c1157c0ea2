use clap::{Parser, Subcommand};
use cohort_app::{config::AppConfig, context::AppContext, logging};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

mod db;
mod group;
mod maintenance;
mod price;
mod rule;
mod seed;
mod user;

#[derive(Debug, Parser)]
#[command(name = "cohort-app", about = "Cohort customer group pricing CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Group(group::GroupCommand),
    User(user::UserCommand),
    Rule(rule::RuleCommand),
    Price(price::PriceCommand),
    Seed(seed::SeedArgs),
    Maintenance(maintenance::MaintenanceCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.config.logging).map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(&self.config, command).await,
            Commands::Group(command) => group::run(&context(&self.config).await?, command).await,
            Commands::User(command) => user::run(&context(&self.config).await?, command).await,
            Commands::Rule(command) => rule::run(&context(&self.config).await?, command).await,
            Commands::Price(command) => price::run(&context(&self.config).await?, command).await,
            Commands::Seed(args) => seed::run(&context(&self.config).await?, args).await,
            Commands::Maintenance(command) => maintenance::run(&context(&self.config).await?, command).await,
        }
    }
}

async fn context(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::from_config(config)
        .await
        .map_err(|error| format!("failed to initialise application: {error}"))
}

/// Render a listing with a bold header row. `numeric` columns are right aligned.
fn render_table(builder: Builder, numeric: std::ops::Range<usize>) -> String {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    table.to_string()
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }

    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
