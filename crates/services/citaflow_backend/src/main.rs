// File: services/citaflow_backend/src/main.rs
use axum::{routing::get, Router};
use citaflow_common::services::ServiceFactory;
use citaflow_config::load_config;
use citaflow_db::{DbClient, SqlSchedulingStore};
use citaflow_scheduling::clock::SystemClock;
use citaflow_scheduling::engine::{SchedulingEngine, SchedulingSettings};
use citaflow_scheduling::routes as citas_routes;
use citaflow_scheduling::store::memory::InMemoryStore;
use citaflow_scheduling::store::SchedulingStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod service_factory;

use service_factory::CitaflowServiceFactory;

#[tokio::main]
async fn main() {
    citaflow_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load configuration"));
    let settings = SchedulingSettings::from_config(&config.scheduling)
        .expect("Invalid scheduling configuration");

    let store: Arc<dyn SchedulingStore> = match &config.database {
        Some(db_config) => {
            let client = DbClient::from_config(db_config)
                .await
                .expect("Failed to connect to the database");
            client
                .init_schema()
                .await
                .expect("Failed to initialize the database schema");
            info!("Using the PostgreSQL scheduling store");
            Arc::new(SqlSchedulingStore::new(client))
        }
        None => {
            warn!("No database configured, falling back to the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let factory = CitaflowServiceFactory::new(config.clone());
    let engine = Arc::new(SchedulingEngine::new(
        store,
        Arc::new(SystemClock),
        factory.notification_service(),
        settings,
    ));

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Citaflow API!" }))
        .merge(citas_routes::routes(engine));

    #[allow(unused_mut)]
    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use citaflow_scheduling::doc::CitasApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", CitasApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
