use std::sync::Arc;

use actix_web::{web, HttpServer};
use tracing::{info, warn};

use tl_api::app::{create_app, AppState};
use tl_api::telemetry::init_tracing;
use tl_core::repositories::{InMemoryTokenRepository, LookupStrategy, TokenRepository};
use tl_core::services::token::{BcryptSecretHasher, SecretHasher, TokenService, TokenServiceConfig};
use tl_infra::database::{DatabasePool, MySqlTokenRepository};
use tl_shared::{AppConfig, ServerConfig, StorageBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting token lifecycle API server");

    config.validate().map_err(anyhow::Error::msg)?;
    if config.token.is_using_default_secret() {
        warn!("Using the development signing secret; set TOKEN_SIGNING_SECRET");
    }

    let strategy: LookupStrategy = config
        .token
        .lookup_strategy
        .parse()
        .map_err(anyhow::Error::msg)?;
    let hasher: Arc<dyn SecretHasher> = Arc::new(BcryptSecretHasher::new(config.token.hash_cost));
    let service_config = TokenServiceConfig::try_from(&config.token)?;

    match config.database.backend {
        StorageBackend::Mysql => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                pool.migrate().await?;
            }
            info!("{}", pool.get_statistics());

            let repository =
                MySqlTokenRepository::new(pool.get_pool().clone(), hasher.clone(), strategy);
            let result = serve(repository, hasher, service_config, &config.server).await;
            pool.close().await;
            result
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory token store; records are lost on restart");
            let repository = InMemoryTokenRepository::new(hasher.clone(), strategy);
            serve(repository, hasher, service_config, &config.server).await
        }
    }
}

async fn serve<R>(
    repository: R,
    hasher: Arc<dyn SecretHasher>,
    service_config: TokenServiceConfig,
    server: &ServerConfig,
) -> anyhow::Result<()>
where
    R: TokenRepository + 'static,
{
    let token_service = Arc::new(TokenService::new(repository, hasher, service_config)?);
    let state = web::Data::new(AppState::new(token_service, server.request_deadline()));

    let bind_address = server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut http_server = HttpServer::new(move || create_app(state.clone()));
    if server.workers > 0 {
        http_server = http_server.workers(server.workers);
    }
    http_server.bind(&bind_address)?.run().await?;

    info!("Server stopped");
    Ok(())
}
