//! Wiring & DI. Entry point: load config and catalog, build one timeline, audit it.
//! No business logic here; everything is delegated to the engine services.

use degree_planner::adapters::SystemClock;
use degree_planner::adapters::persistence::JsonCatalog;
use degree_planner::domain::BuildInput;
use degree_planner::domain::program::COOP_POOL_ID;
use degree_planner::ports::{
    Clock, CoursePoolRepository, CourseRepository, DegreeRepository, TimelineRepository,
    UserRepository,
};
use degree_planner::shared::AppConfig;
use degree_planner::usecases::{DegreeAuditGenerator, TimelineBuilder, validate_coop_timeline};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let input_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: degree-planner <build-input.json>"))?;

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration; using defaults");
        AppConfig::default()
    });
    let policy = cfg.credit_policy();

    // --- Catalog: one in-memory snapshot serves every repository port ---
    let catalog = Arc::new(
        JsonCatalog::load(cfg.catalog_path_or_default())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    let degrees: Arc<dyn DegreeRepository> = catalog.clone();
    let courses: Arc<dyn CourseRepository> = catalog.clone();
    let pools: Arc<dyn CoursePoolRepository> = catalog.clone();
    let timelines: Arc<dyn TimelineRepository> = catalog.clone();
    let users: Arc<dyn UserRepository> = catalog;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- Services ---
    let builder = Arc::new(TimelineBuilder::new(
        degrees,
        courses,
        pools,
        Arc::clone(&timelines),
        Arc::clone(&clock),
        policy,
    ));
    let auditor = DegreeAuditGenerator::new(timelines, users, Arc::clone(&builder), clock, policy);

    // --- Run ---
    let raw = tokio::fs::read_to_string(&input_path)
        .await
        .map_err(|e| anyhow::anyhow!("read {}: {}", input_path, e))?;
    let input: BuildInput = serde_json::from_str(&raw)?;

    let timeline = builder
        .build_timeline(input)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let coop = timeline
        .has_pool(COOP_POOL_ID)
        .then(|| validate_coop_timeline(&timeline));
    let audit = auditor
        .generate_degree_audit_from_timeline(&timeline)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!(
        degree_id = %timeline.degree.id,
        percentage = audit.progress.percentage,
        expected_graduation = %audit.student.expected_graduation,
        "audit complete"
    );

    let report = serde_json::json!({
        "timeline": timeline,
        "coopValidation": coop,
        "audit": audit,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
