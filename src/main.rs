use mimalloc::MiMalloc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fountain_api::auth::TokenService;
use fountain_api::config::Config;
use fountain_api::db::Storage;
use fountain_api::router::{FountainState, build_cors_layer, fountain_router};
use fountain_api::service::chat::ChatClient;
use fountain_api::service::{mailer, object_store, seed};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        bind_addr = %cfg.bind_addr,
        loglevel = %cfg.loglevel,
        "starting fountain-api"
    );

    let storage = Storage::connect(&cfg.database_url).await?;
    seed::seed_admin(&storage, &cfg).await?;
    seed::seed_service_images(&storage).await?;

    let client = reqwest::Client::builder()
        .user_agent("fountain-api/0.1")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()?;

    let tokens = TokenService::from_config(&cfg);
    let mailer = mailer::from_config(&cfg.mail, client.clone());
    let store = object_store::from_config(&cfg.cloud, client.clone());
    let chat = Arc::new(ChatClient::new(client, &cfg.chat));

    let state = FountainState::new(
        storage,
        tokens,
        mailer,
        store,
        chat,
        &cfg.cloud.folder_prefix,
    );
    let app = fountain_router(state).layer(build_cors_layer(&cfg.allowed_origins()));

    let listener = TcpListener::bind(&cfg.bind_addr).await?;
    info!("HTTP server listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
