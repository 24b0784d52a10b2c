//! 基础设施层
//!
//! PostgreSQL 仓储实现和 OpenRouteService 路由客户端。

pub mod database;
pub mod routing;

pub use database::*;
pub use routing::*;
