//! # Techdispatch Core
//!
//! 派单系统的共享基础：数据模型、错误类型、协作方接口、重试策略和配置模型。
//! 不包含任何I/O实现，数据库和路由服务的具体实现位于 infrastructure crate。

pub mod config;
pub mod errors;
pub mod models;
pub mod retry;
pub mod traits;

pub use config::*;
pub use errors::*;
pub use models::*;
pub use retry::{retry_with_backoff, RetryOutcome, RetryPolicy};
pub use traits::*;
