use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::handlers;
use crate::services::{CompanyStore, ExportSink, MongoDb, SheetsExporter, TaxEngine};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub db: MongoDb,
    pub company: Arc<CompanyStore>,
    pub exporter: Option<Arc<dyn ExportSink>>,
    pub tax: TaxEngine,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: ServiceConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let company = Arc::new(CompanyStore::new(&config.assets_dir).await.map_err(|e| {
            tracing::error!(
                "Failed to initialize company store at {}: {}",
                config.assets_dir,
                e
            );
            e
        })?);

        let exporter: Option<Arc<dyn ExportSink>> = match &config.sheets {
            Some(sheets) => Some(Arc::new(SheetsExporter::new(sheets)?)),
            None => {
                tracing::info!("Sheets export credentials not configured, export disabled");
                None
            }
        };

        let tax = TaxEngine::new(config.tax_policy);
        tracing::info!(policy = ?config.tax_policy, "Tax policy selected");

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            company,
            exporter,
            tax,
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route(
                "/invoices",
                get(handlers::list_invoices).post(handlers::create_invoice),
            )
            .route("/invoices/:id", get(handlers::get_invoice))
            .route("/invoices/:id/pdf", get(handlers::download_invoice_pdf))
            .route("/invoices/:id/print", get(handlers::print_invoice_pdf))
            .route("/invoices/:id/export", post(handlers::export_invoice))
            .route(
                "/company",
                get(handlers::get_company).put(handlers::update_company),
            )
            .route("/company/logo", post(handlers::upload_logo))
            .fallback(handlers::route_not_found)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
