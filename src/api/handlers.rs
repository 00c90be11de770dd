use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use super::types::{ErrorBody, PlanBody, PlanEvent};
use super::ServerState;

/// Handles plan requests to the API server.
///
/// Runs the full pipeline for the event's `input`. Unlike the bare
/// [`handle`](super::handle) adapter, a pipeline failure here is mapped to a
/// structured error body with status 500 and the cause is logged.
pub async fn handle_plan(
    State(state): State<ServerState>,
    Json(event): Json<PlanEvent>,
) -> Result<Json<PlanBody>, (StatusCode, Json<ErrorBody>)> {
    let request_id = Uuid::new_v4();
    log::debug!("plan request {request_id}: {}", event.input);

    match state.planner.plan(&event.input).await {
        Ok(itinerary) => Ok(Json(PlanBody { message: itinerary })),
        Err(e) => {
            log::error!("plan request {request_id} failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("plan request failed: {e}"),
                }),
            ))
        }
    }
}
