use axum_helpers::{JwtAuth, ShutdownCoordinator, create_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_shop::identity::SeedAdmin;
use domain_shop::{InMemoryStore, PgStore, run_event_loop};
use mediator::CancellationToken;
use migration::Migrator;
use tracing::{info, warn};

use shop_api::config::Config;
use shop_api::state::AppState;
use shop_api::{build_router, build_state};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let jwt = JwtAuth::new(&config.jwt);
    let cancel = CancellationToken::new();
    let secure_cookies = config.environment.use_https();

    let (state, events) = match config.database.clone() {
        Some(database) => {
            let db = database::postgres::connect_with_retry(database)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
            build_state(PgStore::new(db), jwt, cancel.clone(), secure_cookies)?
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            build_state(InMemoryStore::new(), jwt, cancel.clone(), secure_cookies)?
        }
    };

    if let Some(admin) = config.admin.clone() {
        seed_admin(&state, admin.email, admin.password).await?;
    }

    let event_loop = tokio::spawn(run_event_loop(
        state.mediator.clone(),
        events,
        cancel.clone(),
    ));

    let router = build_router(&state, config.app.clone(), &config.cors);

    // Cancel in-flight pipeline work once shutdown begins
    let shutdown = ShutdownCoordinator::new();
    let watcher = shutdown.clone();
    tokio::spawn(async move {
        watcher.wait().await;
        cancel.cancel();
    });

    create_app(router, &config.server, shutdown).await?;

    if let Err(e) = event_loop.await {
        warn!("Event loop ended abnormally: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn seed_admin(state: &AppState, email: String, password: String) -> eyre::Result<()> {
    let created = state
        .mediator
        .send(SeedAdmin { email: email.clone(), password }, &state.cancel)
        .await?;

    if created {
        info!(%email, "Administrator account created");
    } else {
        info!(%email, "Administrator account already present");
    }
    Ok(())
}
