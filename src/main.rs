//! Fraud Detection API - Main Entry Point
//!
//! Loads the ONNX classifier once at startup and serves predictions over
//! HTTP. A model that fails to load aborts the process before the listener
//! binds.

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use fraud_detection_api::{
    config::AppConfig,
    error,
    metrics::{MetricsReporter, RequestMetrics},
    model::inference::InferenceEngine,
    routes,
};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_detection_api=info".parse()?),
        )
        .init();

    info!("Starting Fraud Detection API");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Load the classifier before binding: no model, no serving
    let engine = Arc::new(InferenceEngine::new(&config)?);
    info!(model = %config.model.path, "Inference engine initialized");

    // Start metrics reporter (logs a summary every 30 seconds)
    let metrics = Arc::new(RequestMetrics::new());
    let reporter_metrics = metrics.clone();
    actix_web::rt::spawn(async move {
        MetricsReporter::new(reporter_metrics, 30).run().await;
    });

    info!(
        host = %config.server.host,
        port = config.server.port,
        workers = config.server.workers,
        "Binding HTTP server"
    );
    info!("  GET  /                    - welcome");
    info!("  GET  /api/v0.1.0/root/    - API overview");
    info!("  POST /api/v0.1.0/predict  - fraud prediction");

    let bind_addr = (config.server.host.clone(), config.server.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(routes::index)
            .service(routes::root_details)
            .service(routes::predict)
    })
    .workers(config.server.workers)
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
