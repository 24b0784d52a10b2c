//! # Techdispatch Testing Utils
//!
//! 各crate共享的测试工具：
//!
//! - **Mock协作方**: 任务仓储、候选人目录、派单存储、路由服务的内存实现
//! - **数据构建器**: 带默认值的测试数据构建
//! - **测试容器**: PostgreSQL 测试容器（需要Docker）
//!
//! ```toml
//! [dev-dependencies]
//! techdispatch-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod containers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use mocks::*;
