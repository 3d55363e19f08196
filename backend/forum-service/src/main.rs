use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpMessage, HttpRequest, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth_core::TokenService;
use forum_service::config::{Config, StorageBackend};
use forum_service::domain::Domain;
use forum_service::middleware::{CurrentUser, IdentityMiddleware};
use forum_service::schema::{build_schema, AppSchema};
use forum_service::storage::memory::MemoryStorage;
use forum_service::storage::postgres::PgStorage;
use forum_service::storage::Storage;

async fn graphql_handler(
    schema: web::Data<AppSchema>,
    req: HttpRequest,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = gql_request.into_inner();
    // Hand the identity resolved by the middleware to the resolvers; absent
    // means the request proceeds unauthenticated.
    if let Some(current) = req.extensions().get::<CurrentUser>().cloned() {
        request = request.data(current);
    }
    schema.execute(request).await.into()
}

async fn graphql_playground() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/query").finish())
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🔧 Starting forum-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: backend={:?}, port={}",
        config.storage.backend, config.app.port
    );

    let storage: Arc<dyn Storage> = match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres storage backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .min_connections(config.storage.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await
                .context("Failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("✅ Database pool created and migrations applied");

            Arc::new(PgStorage::new(pool))
        }
        StorageBackend::Memory => {
            let storage = MemoryStorage::load(&config.storage.data_dir)
                .context("Failed to initialize in-memory storage")?;
            info!("✅ In-memory storage loaded from {}", config.storage.data_dir);
            Arc::new(storage)
        }
    };

    let tokens = TokenService::new(&config.jwt.secret, config.jwt.issuer.clone());
    let domain = Arc::new(Domain::new(Arc::clone(&storage), tokens.clone()));
    let schema = build_schema(domain, Arc::clone(&storage));

    let bind_addr = (config.app.host.clone(), config.app.port);
    let cors_origin = config.app.cors_allowed_origin.clone();

    info!(
        "connect to http://localhost:{}/ for the GraphQL playground",
        config.app.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(schema.clone()))
            .wrap(IdentityMiddleware::new(
                Arc::clone(&storage),
                tokens.clone(),
            ))
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
            )
            .route("/query", web::post().to(graphql_handler))
            .route("/", web::get().to(graphql_playground))
            .route("/health", web::get().to(health))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
