//! Maintenance CLI that recomputes stored rating aggregates from the review rows.

use anyhow::{Context, Result};
use clap::Parser;
use review_collector::{
    catalog::{CatalogService, RecomputeOutcome},
    config::ConfigLoader,
    db,
    telemetry::init_tracing,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "recompute_ratings",
    version,
    about = "Recompute product average ratings and review counts"
)]
struct Cli {
    /// Only recompute this product (defaults to every product)
    #[arg(long)]
    product: Option<Uuid>,
    /// Report drift without writing anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Override REVIEWS_DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

fn report(outcome: &RecomputeOutcome, dry_run: bool) {
    if !outcome.drifted {
        return;
    }
    let verb = if dry_run { "would update" } else { "updated" };
    println!(
        "{} {}: {:.3} ({} reviews) -> {:.3} ({} reviews)",
        verb,
        outcome.product_id,
        outcome.previous.average_rating,
        outcome.previous.total_reviews,
        outcome.current.average_rating,
        outcome.current.total_reviews,
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    init_tracing(&config)?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await?;

    let catalog = CatalogService::new(db, config.aggregate_strategy);

    let outcomes = match cli.product {
        Some(product_id) => vec![
            catalog
                .recompute_product(product_id, cli.dry_run)
                .await
                .with_context(|| format!("recomputing product {}", product_id))?,
        ],
        None => catalog
            .recompute_all(cli.dry_run)
            .await
            .context("recomputing all products")?,
    };

    for outcome in &outcomes {
        report(outcome, cli.dry_run);
    }

    let drifted = outcomes.iter().filter(|outcome| outcome.drifted).count();
    println!(
        "Checked {} product(s), {} with stale aggregates{}.",
        outcomes.len(),
        drifted,
        if cli.dry_run { " (dry run, nothing written)" } else { "" }
    );

    Ok(())
}
