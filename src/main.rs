//! TestTrack server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use testtrack_lib::api::{self, ApiDoc};
use testtrack_lib::config::Config;
use testtrack_lib::db::DbPool;
use testtrack_lib::middleware::RequestLogger;
use testtrack_lib::services::EventBroadcaster;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set to a non-default value");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  TestTrack Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let broadcaster = EventBroadcaster::new();
    let engine = testtrack_lib::build_engine(&config, &pool, &broadcaster);
    info!(
        "Sequence lock timeout: {}ms",
        config.sequence_lock_timeout_ms
    );

    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };
    info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(broadcaster.clone()))
            .app_data(web::Data::new(engine.clone()))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_test_case_routes)
                    .configure(api::configure_notification_routes)
                    .configure(api::configure_websocket_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
