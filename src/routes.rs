//! HTTP surface for the fraud detection API
//!
//! Three routes: a welcome message, an API overview, and the prediction
//! endpoint. Every request is independent; the only shared state is the
//! read-only inference engine and the metrics collector.

use crate::error::ApiError;
use crate::metrics::RequestMetrics;
use crate::model::inference::InferenceEngine;
use crate::types::api::{ApiOverview, EndpointInfo, WelcomeResponse};
use crate::types::transaction::Transaction;
use actix_web::{get, post, web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[get("/")]
pub async fn index() -> impl Responder {
    web::Json(WelcomeResponse {
        message: "Welcome to the Credit Card Fraud Detection API",
        details: "Visit '/api/v0.1.0/root/' for an overview of available endpoints.",
    })
}

#[get("/api/v0.1.0/root/")]
pub async fn root_details() -> impl Responder {
    web::Json(ApiOverview {
        overview: "This API offers endpoints for fraud prediction in credit card transactions.",
        endpoints: vec![
            EndpointInfo {
                path: "/",
                description: "Root endpoint providing welcome message and high-level overview.",
            },
            EndpointInfo {
                path: "/api/v0.1.0/predict",
                description:
                    "Predicts fraud likelihood and provides the probability for a given transaction.",
            },
        ],
    })
}

#[post("/api/v0.1.0/predict")]
pub async fn predict(
    engine: web::Data<Arc<InferenceEngine>>,
    metrics: web::Data<Arc<RequestMetrics>>,
    payload: web::Json<Transaction>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let transaction = payload.into_inner();

    if let Err(validation) = transaction.validate() {
        metrics.record_rejected();
        return Err(ApiError::Validation(validation));
    }

    let result = engine.predict(&transaction).map_err(|e| {
        metrics.record_failed();
        ApiError::Inference(e)
    })?;

    metrics.record_request(started.elapsed(), result.fraud_probability);
    debug!(
        fraud = result.fraud_prediction,
        probability = result.fraud_probability,
        elapsed_us = started.elapsed().as_micros() as u64,
        "Prediction served"
    );

    Ok(HttpResponse::Ok().json(result))
}
