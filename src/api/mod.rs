//! Entry points for external invocation.
//!
//! Two shapes are exposed: a bare event adapter (`handle`) that wraps the
//! pipeline result as an HTTP-shaped value and lets failures propagate to
//! the caller, and an axum server (feature `api`) that additionally maps
//! failures to a structured JSON error response.

#[cfg(feature = "api")]
mod handlers;
mod types;

use std::collections::HashMap;

use crate::{error::PlannerError, pipeline::TravelPlanner};

pub use types::{ErrorBody, PlanBody, PlanEvent, PlanHttpResponse};

/// Adapts an inbound event into a pipeline run and wraps the itinerary as a
/// success response with status 200.
///
/// A pipeline failure is returned as `Err` unchanged; no error-status mapping
/// happens at this layer.
pub async fn handle(
    planner: &TravelPlanner,
    event: PlanEvent,
) -> Result<PlanHttpResponse, PlannerError> {
    let itinerary = planner.plan(&event.input).await?;
    Ok(PlanHttpResponse {
        status_code: 200,
        headers: HashMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]),
        body: PlanBody { message: itinerary },
    })
}

/// HTTP server exposing the planning pipeline.
#[cfg(feature = "api")]
pub struct Server {
    planner: std::sync::Arc<TravelPlanner>,
}

/// Internal server state shared between request handlers.
#[cfg(feature = "api")]
#[derive(Clone)]
struct ServerState {
    planner: std::sync::Arc<TravelPlanner>,
}

#[cfg(feature = "api")]
impl Server {
    /// Creates a new server instance around a planner.
    pub fn new(planner: TravelPlanner) -> Self {
        Self {
            planner: std::sync::Arc::new(planner),
        }
    }

    /// Starts the server and listens for requests on the specified address.
    pub async fn run(self, addr: &str) -> Result<(), PlannerError> {
        let app = axum::Router::new()
            .route("/v1/plan", axum::routing::post(handlers::handle_plan))
            .layer(tower_http::cors::CorsLayer::permissive())
            .with_state(ServerState {
                planner: self.planner,
            });

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| PlannerError::InvalidRequest(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| PlannerError::InvalidRequest(e.to_string()))?;

        Ok(())
    }
}
