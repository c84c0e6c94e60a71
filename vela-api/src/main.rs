use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vela_api::{app, AppState};
use vela_core::repository::PricingRunRepository;
use vela_revenue::{CalendarService, EngineStores, PricingRunOrchestrator};
use vela_store::{
    Config, DbClient, PostgresListingPriceRepository, PostgresMarketFactorRepository,
    PostgresOccupancyProvider, PostgresPricingAuditRepository, PostgresPricingRulesRepository,
    PostgresPricingRunRepository, PostgresRoomTypeRepository, PostgresSeasonalityRepository,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vela_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Vela API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let pool = db.pool.clone();
    let listing_prices = Arc::new(PostgresListingPriceRepository::new(pool.clone()));
    let audits = Arc::new(PostgresPricingAuditRepository::new(pool.clone()));
    let runs: Arc<dyn PricingRunRepository> =
        Arc::new(PostgresPricingRunRepository::new(pool.clone()));

    let stores = EngineStores {
        room_types: Arc::new(PostgresRoomTypeRepository::new(pool.clone())),
        rules: Arc::new(PostgresPricingRulesRepository::new(pool.clone())),
        seasonality: Arc::new(PostgresSeasonalityRepository::new(pool.clone())),
        market_factors: Arc::new(PostgresMarketFactorRepository::new(pool.clone())),
        occupancy: Arc::new(PostgresOccupancyProvider::new(pool.clone())),
        listing_prices: listing_prices.clone(),
        audits: audits.clone(),
        runs: runs.clone(),
    };

    let state = AppState {
        orchestrator: PricingRunOrchestrator::new(stores),
        calendar: CalendarService::new(listing_prices, audits),
        runs,
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
