use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use salon_api::config::ApiConfig;
use salon_core::booking::BookingService;
use salon_core::clock::SystemClock;
use salon_core::notify::{LogNotifier, Notifier};
use salon_db::{PgStore, create_pool, schema::initialize_database};
use salon_telegram::{TelegramConfig, TelegramNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    let telegram = TelegramConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));

    // Telegram delivery is optional; without a token events are only logged
    let notifier: Arc<dyn Notifier> = match telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(
            telegram,
            store.clone(),
            config.timezone,
        )),
        None => Arc::new(LogNotifier),
    };

    let bookings = BookingService::new(
        store.clone(),
        store,
        notifier,
        Arc::new(SystemClock),
        config.booking_settings(),
    );

    // Start API server
    salon_api::start_server(config, bookings).await?;

    Ok(())
}
