use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 派单记录
///
/// 只追加：提交后即为不可变历史，核心流程从不更新或删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 由存储分配，提交前为 `None`
    pub id: Option<i64>,
    pub task_id: i64,
    pub candidate_id: i64,
    pub distance_km: f64,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(task_id: i64, candidate_id: i64, distance_km: f64) -> Self {
        Self {
            id: None,
            task_id,
            candidate_id,
            distance_km,
            assigned_at: Utc::now(),
        }
    }
}

/// 单次派单尝试的状态
///
/// ```text
/// Started → Shortlisted → Resolved → Selected → Committed
///    └──────────┴────────────┴──────────┴──────► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStage {
    Started,
    Shortlisted,
    Resolved,
    Selected,
    Committed,
    Failed,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchStage::Started => "started",
            DispatchStage::Shortlisted => "shortlisted",
            DispatchStage::Resolved => "resolved",
            DispatchStage::Selected => "selected",
            DispatchStage::Committed => "committed",
            DispatchStage::Failed => "failed",
        };
        f.write_str(name)
    }
}
