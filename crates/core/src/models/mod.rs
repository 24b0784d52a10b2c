//! # 数据模型
//!
//! 派单流程中的核心数据结构：任务（客户请求）、候选技术员、短名单条目、
//! 距离解析结果以及最终的派单记录。
//!
//! ## 数据流转
//!
//! ```text
//! Task ──► Candidate[] ──► ShortlistEntry[] ──► ResolvedCandidate[] ──► Assignment
//!          (目录查询)       (大圆距离预筛)        (路程距离解析)          (持久化)
//! ```
//!
//! ## 设计原则
//!
//! - 坐标统一使用 `f64` 度数，通过 [`Location::new`] 校验范围
//! - 标识符使用数据库自增主键 `i64`，排序按数值升序
//! - 所有时间字段使用 `DateTime<Utc>`
//! - `Assignment` 一经提交即为不可变历史记录

pub mod assignment;
pub mod candidate;
pub mod location;
pub mod task;

pub use assignment::*;
pub use candidate::*;
pub use location::*;
pub use task::*;
