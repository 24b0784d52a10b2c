use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use techdispatch_core::errors::DispatchError;

use crate::{error::ApiResult, response::created, routes::AppState};

/// 为任务派单
///
/// 任务不存在时返回404，不会进入派单流程。
pub async fn dispatch_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let task = state
        .task_repo
        .get_by_id(task_id)
        .await?
        .ok_or(DispatchError::TaskNotFound { id: task_id })?;

    info!("收到派单请求: 任务 {}", task_id);
    let assignment = state.coordinator.dispatch(&task).await?;

    Ok(created(assignment))
}
