use actix_web::HttpServer;
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

use gb_api::{build_components, create_app, telemetry};
use gb_infra::{
    DatabasePool, MailTransport, MySqlOtpRepository, MySqlPrincipalRepository,
    MySqlSessionRepository, RedisCacheService, RedisClient,
};
use gb_shared::config::{load_dotenv, AppConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();

    telemetry::init_tracing(&config.logging)?;
    info!(environment = %config.environment, "Starting Gigboard API server");

    if let Err(reason) = config.validate() {
        error!(reason = %reason, "refusing to start with invalid configuration");
        anyhow::bail!("invalid configuration: {}", reason);
    }

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to MySQL")?;
    database
        .run_migrations()
        .await
        .context("failed to run database migrations")?;
    info!(pool = %database.get_statistics(), "Database ready");

    let pool = database.get_pool().clone();
    let principals = Arc::new(MySqlPrincipalRepository::new(pool.clone()));
    let sessions = Arc::new(MySqlSessionRepository::new(pool.clone()));
    let otps = Arc::new(MySqlOtpRepository::new(pool));

    let redis = RedisClient::new(config.cache.clone())
        .await
        .context("failed to connect to Redis")?;
    let cache = Arc::new(RedisCacheService::new(redis));

    let mail = Arc::new(
        MailTransport::from_config(&config.mail, config.auth.otp.ttl_seconds)
            .context("failed to configure mail transport")?,
    );
    info!(provider = mail.provider_name(), "Mail transport ready");

    let components = build_components(principals, sessions, otps, cache, mail, &config.auth);
    let _cleanup = Arc::clone(&components.cleanup).start_background_task();

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, workers = config.server.workers, "Server will bind");

    let cors = config.cors.clone();
    let environment = config.environment;
    let max_payload_size = config.server.max_payload_size;

    let mut server =
        HttpServer::new(move || create_app(&components, &cors, environment, max_payload_size));
    // Zero keeps actix's default of one worker per core
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    database.close().await;
    info!("Server stopped");
    Ok(())
}
