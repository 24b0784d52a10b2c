//! 大圆距离预筛
//!
//! 纯函数，不挂起：按haversine距离从在岗技术员中选出最近的K个。

use std::cmp::Ordering;

use tracing::{debug, warn};

use techdispatch_core::models::{Candidate, Location, ShortlistEntry};

/// 生成短名单
///
/// - 过滤掉不在岗的候选人和坐标非法的候选人
/// - 按大圆距离升序排列，距离相同时按候选人ID升序
/// - 最多返回 `k` 个；候选人不足 `k` 个时全部返回
/// - 没有在岗候选人时返回空列表，这是合法的终态而不是错误
pub fn shortlist(target: &Location, candidates: &[Candidate], k: usize) -> Vec<ShortlistEntry> {
    let mut entries: Vec<ShortlistEntry> = candidates
        .iter()
        .filter(|candidate| candidate.active)
        .filter(|candidate| {
            let valid = candidate.location.is_valid();
            if !valid {
                warn!(
                    "技术员 {} 的坐标非法 ({}, {})，跳过",
                    candidate.id, candidate.location.latitude, candidate.location.longitude
                );
            }
            valid
        })
        .map(|candidate| ShortlistEntry {
            great_circle_km: target.haversine_km(&candidate.location),
            candidate: candidate.clone(),
        })
        .collect();

    entries.sort_by(compare_entries);
    entries.truncate(k);

    debug!(
        "预筛完成: {} 个候选人中选出 {} 个 (K={})",
        candidates.len(),
        entries.len(),
        k
    );

    entries
}

fn compare_entries(a: &ShortlistEntry, b: &ShortlistEntry) -> Ordering {
    a.great_circle_km
        .total_cmp(&b.great_circle_km)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}
