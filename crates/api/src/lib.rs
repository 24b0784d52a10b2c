//! # Techdispatch API
//!
//! 派单服务的HTTP接口。
//!
//! ## API 端点
//!
//! - `POST /api/dispatch/{task_id}` - 为任务派单，返回提交的派单记录
//! - `GET /api/assignments` - 派单记录列表（按派单时间倒序）
//! - `GET /health` - 健康检查
//! - `GET /metrics` - Prometheus 指标
//!
//! ## 错误响应
//!
//! ```json
//! {
//!   "success": false,
//!   "error": { "code": "NO_CANDIDATES", "message": "没有可用的技术员" },
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;

use techdispatch_core::config::ApiConfig;

use middleware::{request_logging, timeout_layer, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(Duration::from_secs(
                api_config.request_timeout_seconds,
            )))
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
