use serde::{Deserialize, Serialize};

use super::Location;

/// 待派单任务（客户请求）
///
/// 在一次派单尝试期间只读借用，不会被修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub location: Location,
}

impl Task {
    pub fn new(id: i64, location: Location) -> Self {
        Self { id, location }
    }
}
