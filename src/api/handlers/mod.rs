use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::db::Database;
use crate::error::StackError;
use crate::models::*;
use crate::routines::RoutineCatalog;
use crate::stacks::HabitStacks;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a domain error to a status code and a human-readable message.
///
/// Persistence errors keep their underlying cause in the message so the
/// caller can see what the store reported.
fn error_response(e: StackError) -> (StatusCode, String) {
    let status = match &e {
        StackError::NotFound(_) | StackError::HabitNotFound { .. } => StatusCode::NOT_FOUND,
        StackError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StackError::Conflict { .. } => StatusCode::CONFLICT,
        StackError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Internal error: {}", e);
    } else {
        tracing::warn!("Request failed: {}", e);
    }

    (status, e.to_string())
}

/// Unwrap a JSON body, reporting every kind of malformed body as 422.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, (StatusCode, String)> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            Err((StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()))
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn root() -> impl IntoResponse {
    Json(MessageResponse::new("Habit Stack Builder API is running"))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "Habit Stack Builder API",
        "timestamp": Utc::now(),
    }))
}

// ============================================================
// Routines
// ============================================================

pub async fn list_routines(State(routines): State<RoutineCatalog>) -> Json<Vec<Routine>> {
    Json(routines.list().to_vec())
}

// ============================================================
// Habit Stacks
// ============================================================

pub async fn list_stacks(State(stacks): State<HabitStacks<Database>>) -> ApiResult<Vec<HabitStack>> {
    stacks.list().map(Json).map_err(error_response)
}

pub async fn create_stack(
    State(stacks): State<HabitStacks<Database>>,
    payload: Result<Json<CreateStackInput>, JsonRejection>,
) -> ApiResult<HabitStack> {
    let input = body(payload)?;
    stacks.create(input).map(Json).map_err(error_response)
}

pub async fn get_stack(
    State(stacks): State<HabitStacks<Database>>,
    Path(id): Path<String>,
) -> ApiResult<HabitStack> {
    stacks.get(&id).map(Json).map_err(error_response)
}

pub async fn update_stack(
    State(stacks): State<HabitStacks<Database>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStackInput>, JsonRejection>,
) -> ApiResult<HabitStack> {
    let input = body(payload)?;
    stacks.update(&id, input).map(Json).map_err(error_response)
}

pub async fn delete_stack(
    State(stacks): State<HabitStacks<Database>>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    stacks.delete(&id).map_err(error_response)?;
    Ok(Json(MessageResponse::new("Habit stack deleted successfully")))
}

// ============================================================
// Habits within a stack
// ============================================================

pub async fn add_habit(
    State(stacks): State<HabitStacks<Database>>,
    Path(id): Path<String>,
    payload: Result<Json<AddHabitInput>, JsonRejection>,
) -> ApiResult<HabitStack> {
    let input = body(payload)?;
    stacks.add_habit(&id, input).map(Json).map_err(error_response)
}

pub async fn update_habit(
    State(stacks): State<HabitStacks<Database>>,
    Path((id, habit_id)): Path<(String, String)>,
    payload: Result<Json<UpdateHabitInput>, JsonRejection>,
) -> ApiResult<HabitStack> {
    let input = body(payload)?;
    stacks
        .update_habit(&id, &habit_id, input)
        .map(Json)
        .map_err(error_response)
}

pub async fn remove_habit(
    State(stacks): State<HabitStacks<Database>>,
    Path((id, habit_id)): Path<(String, String)>,
) -> ApiResult<MessageResponse> {
    stacks.remove_habit(&id, &habit_id).map_err(error_response)?;
    Ok(Json(MessageResponse::new("Habit removed successfully")))
}
