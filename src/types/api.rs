//! Static metadata payloads for the discovery routes

use serde::Serialize;

/// Welcome payload served at the root route.
#[derive(Debug, Clone, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub details: &'static str,
}

/// One advertised endpoint in the API overview.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub description: &'static str,
}

/// Overview payload listing the available endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApiOverview {
    pub overview: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}
