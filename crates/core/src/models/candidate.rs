use serde::{Deserialize, Serialize};

use super::Location;
use crate::errors::RoutingError;

/// 候选技术员
///
/// 每次派单尝试都从目录重新读取，不跨尝试缓存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub location: Location,
    pub active: bool,
}

impl Candidate {
    pub fn new(id: i64, location: Location, active: bool) -> Self {
        Self {
            id,
            location,
            active,
        }
    }
}

/// 预筛短名单条目：候选人及其到任务的大圆距离
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub candidate: Candidate,
    pub great_circle_km: f64,
}

/// 路程距离解析失败标记
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    /// 最后一次尝试的错误
    pub error: RoutingError,
    /// 实际发起的尝试次数
    pub attempts: u32,
}

/// 距离解析结果，与短名单条目一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCandidate {
    pub entry: ShortlistEntry,
    pub accurate_km: std::result::Result<f64, ResolutionFailure>,
}

impl ResolvedCandidate {
    pub fn is_resolved(&self) -> bool {
        self.accurate_km.is_ok()
    }
}
