//! 协作方接口定义
//!
//! 派单核心只通过以下契约访问外部系统：
//! - `TaskRepository` - 读取任务（客户请求）及其位置
//! - `CandidateDirectory` - 读取当前在岗的技术员
//! - `AssignmentStore` - 追加写入派单记录
//! - `HealthCheck` - 存储健康检查
//!
//! 连接池等共享资源由外层持有，核心把它们视为不透明的请求/响应能力。
//! 所有实现都必须是 `Send + Sync`。

use async_trait::async_trait;

use crate::models::{Assignment, Candidate, Task};
use crate::Result;

/// 任务仓储接口
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 根据ID获取任务，不存在时返回 `None`
    async fn get_by_id(&self, id: i64) -> Result<Option<Task>>;
}

/// 候选技术员目录
#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    /// 列出当前在岗的技术员
    ///
    /// 只读、无副作用，必须反映最新的在岗状态。
    async fn list_active(&self) -> Result<Vec<Candidate>>;
}

/// 派单记录存储
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// 追加写入一条派单记录，返回带有持久化ID和时间戳的记录
    async fn insert(&self, assignment: &Assignment) -> Result<Assignment>;

    /// 按派单时间倒序列出所有记录
    async fn list(&self) -> Result<Vec<Assignment>>;
}

/// 健康检查
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<()>;
}
