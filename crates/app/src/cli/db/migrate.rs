use cohort_app::{config::AppConfig, database};

pub(crate) async fn run(config: &AppConfig) -> Result<(), String> {
    let pool = database::connect(&config.database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to apply schema: {error}"))?;

    println!("schema applied to {}", config.database.database_url);

    Ok(())
}
