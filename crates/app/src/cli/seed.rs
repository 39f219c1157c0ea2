use std::path::PathBuf;

use clap::Args;
use cohort::fixtures::Fixture;
use cohort_app::context::AppContext;
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct SeedArgs {
    /// YAML fixture describing the catalog, groups, assignments and rules
    #[arg(long)]
    fixture: PathBuf,
}

pub(crate) async fn run(ctx: &AppContext, args: SeedArgs) -> Result<(), String> {
    let fixture = Fixture::load(&args.fixture)
        .map_err(|error| format!("failed to load fixture {}: {error}", args.fixture.display()))?;

    let report = ctx
        .seeder()
        .seed(&fixture, Timestamp::now())
        .await
        .map_err(|error| format!("failed to seed fixture: {error}"))?;

    let mut groups: Vec<_> = report.groups.iter().collect();
    groups.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    for (key, id) in groups {
        println!("group {key}: {id}");
    }

    println!("rules created: {}", report.rules.len());

    Ok(())
}
