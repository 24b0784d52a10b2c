use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use techdispatch_core::traits::{AssignmentStore, HealthCheck, TaskRepository};
use techdispatch_dispatcher::DispatchCoordinator;

use crate::handlers::{
    assignments::list_assignments, dispatch::dispatch_task, health::health_check,
    metrics::render_metrics,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub task_repo: Arc<dyn TaskRepository>,
    pub assignment_store: Arc<dyn AssignmentStore>,
    pub coordinator: Arc<DispatchCoordinator>,
    pub health: Arc<dyn HealthCheck>,
    /// 未启用指标时为 `None`
    pub metrics: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/api/dispatch/{task_id}", post(dispatch_task))
        .route("/api/assignments", get(list_assignments))
        .with_state(state)
}
