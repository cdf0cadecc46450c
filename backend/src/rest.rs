use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use shared::{
    CreateChildRequest, CreateChildResponse, ErrorResponse, MessageResponse, SaveSnackRequest,
    SnackRequest, UpdateChildRequest,
};
use tracing::info;

use crate::domain::{ChildService, DomainError, SnackService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub children: ChildService,
    pub snacks: SnackService,
}

impl AppState {
    pub fn new(children: ChildService, snacks: SnackService) -> Self {
        Self { children, snacks }
    }
}

/// Build the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/children", get(list_children).post(create_child))
        .route(
            "/api/children/:child_id",
            put(update_child).delete(delete_child),
        )
        .route("/get_snack", post(get_snack))
        .route("/save_snack", post(save_snack))
        .route("/get_snacks/:child_id", get(list_snacks))
        .route("/delete_snack/:snack_id", delete(delete_snack))
        .with_state(state)
}

/// Map a domain failure onto the HTTP status and error envelope. Internal
/// failures are logged in full but reach the user as the per-action retry
/// message, matching the rest of the contract.
fn error_response(err: DomainError, internal_message: &str) -> Response {
    let (status, error) = match err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Internal(cause) => {
            tracing::error!("{}: {:?}", internal_message, cause);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_message.to_string(),
            )
        }
    };
    (status, Json(ErrorResponse { error })).into_response()
}

/// GET /api/children
async fn list_children(State(state): State<AppState>) -> Response {
    info!("GET /api/children");

    match state.children.list_children().await {
        Ok(children) => (StatusCode::OK, Json(children)).into_response(),
        Err(e) => error_response(e, "Error fetching children. Please try again."),
    }
}

/// POST /api/children
async fn create_child(
    State(state): State<AppState>,
    Json(request): Json<CreateChildRequest>,
) -> Response {
    info!("POST /api/children - name: {}", request.name);

    match state.children.create_child(request).await {
        Ok(child) => (
            StatusCode::CREATED,
            Json(CreateChildResponse {
                message: "Child added successfully".to_string(),
                child,
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Error adding child. Please try again."),
    }
}

/// PUT /api/children/:child_id
async fn update_child(
    State(state): State<AppState>,
    Path(child_id): Path<i64>,
    Json(request): Json<UpdateChildRequest>,
) -> Response {
    info!("PUT /api/children/{}", child_id);

    match state.children.update_child(child_id, request).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Child updated successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Error updating child. Please try again."),
    }
}

/// DELETE /api/children/:child_id
async fn delete_child(State(state): State<AppState>, Path(child_id): Path<i64>) -> Response {
    info!("DELETE /api/children/{}", child_id);

    match state.children.delete_child(child_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Child deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Error deleting child. Please try again."),
    }
}

/// POST /get_snack
async fn get_snack(State(state): State<AppState>, Json(request): Json<SnackRequest>) -> Response {
    info!("POST /get_snack - children: {:?}", request.children);

    match state.snacks.suggest(&request.children).await {
        Ok(suggestion) => (StatusCode::OK, Json(suggestion)).into_response(),
        Err(e) => error_response(e, "Error generating snack. Please try again."),
    }
}

/// POST /save_snack
async fn save_snack(
    State(state): State<AppState>,
    Json(request): Json<SaveSnackRequest>,
) -> Response {
    info!("POST /save_snack - child_id: {}", request.child_id);

    match state.snacks.save(request).await {
        Ok(message) => (StatusCode::OK, Json(MessageResponse { message })).into_response(),
        Err(e) => error_response(e, "Error saving snack. Please try again."),
    }
}

/// GET /get_snacks/:child_id
async fn list_snacks(State(state): State<AppState>, Path(child_id): Path<i64>) -> Response {
    info!("GET /get_snacks/{}", child_id);

    match state.snacks.list_saved(child_id).await {
        Ok(snacks) => (StatusCode::OK, Json(snacks)).into_response(),
        Err(e) => error_response(e, "Error fetching snacks. Please try again."),
    }
}

/// DELETE /delete_snack/:snack_id
async fn delete_snack(State(state): State<AppState>, Path(snack_id): Path<i64>) -> Response {
    info!("DELETE /delete_snack/{}", snack_id);

    match state.snacks.delete_saved(snack_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Snack deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e, "Error deleting snack. Please try again."),
    }
}
