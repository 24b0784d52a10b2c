//! 排序与选择
//!
//! 纯函数：从距离解析结果中选出唯一的胜出者。

use std::cmp::Ordering;

use tracing::debug;

use techdispatch_core::models::{Candidate, ResolvedCandidate};

/// 胜出的候选人
#[derive(Debug, Clone, PartialEq)]
pub struct Winner {
    pub candidate: Candidate,
    pub great_circle_km: f64,
    pub accurate_km: f64,
}

/// 选择结果
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Winner(Winner),
    /// 没有任何条目解析成功，表示路由服务侧失败而不是没有候选人
    NoneAvailable,
}

/// 选择路程距离最短的候选人
///
/// 路程距离相同时优先大圆距离更小的，再相同时优先ID更小的，
/// 保证任意输入都有唯一确定的胜出者。解析失败的条目从不入选。
pub fn select(resolved: &[ResolvedCandidate]) -> Selection {
    let best = resolved
        .iter()
        .filter_map(|item| match item.accurate_km {
            Ok(accurate_km) if accurate_km.is_finite() => Some(Winner {
                candidate: item.entry.candidate.clone(),
                great_circle_km: item.entry.great_circle_km,
                accurate_km,
            }),
            _ => None,
        })
        .min_by(compare_winners);

    match best {
        Some(winner) => {
            debug!(
                "选择技术员 {} (路程 {:.3}km, 直线 {:.3}km)",
                winner.candidate.id, winner.accurate_km, winner.great_circle_km
            );
            Selection::Winner(winner)
        }
        None => {
            debug!("{} 个候选人均无有效路程距离", resolved.len());
            Selection::NoneAvailable
        }
    }
}

fn compare_winners(a: &Winner, b: &Winner) -> Ordering {
    a.accurate_km
        .total_cmp(&b.accurate_km)
        .then_with(|| a.great_circle_km.total_cmp(&b.great_circle_km))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}
