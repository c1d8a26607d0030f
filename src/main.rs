use std::sync::Arc;

use poem::{EndpointExt, Route, listener::TcpListener, middleware::Cors};
use poem_openapi::OpenApiService;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod auth;
mod config;
mod entities;
mod error;
mod migration;
mod state;
mod stormglass;

use api::auth::AuthApi;
use api::blog::BlogApi;
use api::logbook::LogbookApi;
use api::weather::WeatherApi;
use config::Config;
use state::AppState;
use stormglass::StormglassClient;

pub fn build_app(state: Arc<AppState>) -> Route {
    let api = OpenApiService::new(
        (
            AuthApi {
                state: state.clone(),
            },
            BlogApi {
                state: state.clone(),
            },
            LogbookApi {
                state: state.clone(),
            },
            WeatherApi { state },
        ),
        "tidelog",
        env!("CARGO_PKG_VERSION"),
    )
    .server("/");
    let ui = api.swagger_ui();

    Route::new().nest("/docs", ui).nest("/", api)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    let db = Database::connect(config.database_url.as_str()).await?;
    migration::Migrator::up(&db, None).await?;

    let weather = StormglassClient::new(
        config.stormglass_api_key.clone(),
        config.forecast_lat,
        config.forecast_lng,
    )?;

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        db,
        config,
        weather,
    });

    let app = build_app(state).with(Cors::new());

    info!("listening on {bind_addr}");
    poem::Server::new(TcpListener::bind(bind_addr)).run(app).await?;
    Ok(())
}
