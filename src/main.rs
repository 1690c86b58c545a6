use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zencable_api::config::Config;
use zencable_api::services::{notifier::ReminderNotifier, reminder_scheduler::ReminderScheduler};
use zencable_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    ReminderScheduler::reconcile_on_startup(&pool).await?;

    let notifier = Arc::new(ReminderNotifier::new(config.clone()));
    if notifier.is_configured() {
        info!("SignalWire notifications configured");
    } else {
        info!("SignalWire not configured — reminder sends will be recorded as failed");
    }

    ReminderScheduler::start(pool.clone(), notifier.clone());

    let state = AppState {
        db: pool,
        config: config.clone(),
        notifier,
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Zen Cable API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
