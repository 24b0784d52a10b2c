use axum::{extract::State, response::IntoResponse};

use crate::{error::ApiResult, response::success, routes::AppState};

pub async fn list_assignments(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let assignments = state.assignment_store.list().await?;
    Ok(success(assignments))
}
