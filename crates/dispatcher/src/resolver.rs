//! 路程距离解析
//!
//! 对短名单中的每个候选人并发查询外部路由服务：
//!
//! - 同时在途的查询数受信号量限制，信号量属于单次解析调用
//! - 每次查询有独立超时，瞬时失败按退避策略重试
//! - 一个查询失败不会取消其他查询，等待全部到达终态后返回
//! - 结果与输入短名单位置一一对应，失败的条目带失败标记
//!
//! 解析调用被丢弃（例如调用方超时）时，在途查询随之取消，许可自动归还。

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use techdispatch_core::{
    config::DispatchConfig,
    errors::RoutingError,
    models::{Location, ResolutionFailure, ResolvedCandidate, ShortlistEntry},
    retry::{retry_with_backoff, RetryPolicy},
    traits::RoutingCapability,
};

use crate::metrics;

pub struct DistanceResolver {
    routing: Arc<dyn RoutingCapability>,
    max_in_flight: usize,
    query_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl DistanceResolver {
    pub fn new(routing: Arc<dyn RoutingCapability>, config: &DispatchConfig) -> Self {
        Self {
            routing,
            max_in_flight: config.max_concurrent_queries.max(1),
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            retry_policy: RetryPolicy::from(&config.retry),
        }
    }

    /// 解析短名单中每个候选人到目标的路程距离
    ///
    /// 输出长度始终等于输入长度。全部失败时返回全失败标记，不返回错误。
    pub async fn resolve(
        &self,
        target: Location,
        shortlist: &[ShortlistEntry],
    ) -> Vec<ResolvedCandidate> {
        if shortlist.is_empty() {
            return Vec::new();
        }

        let permits = Semaphore::new(self.max_in_flight);
        let queries = shortlist
            .iter()
            .map(|entry| self.resolve_entry(&permits, target, entry));
        let resolved = join_all(queries).await;

        let succeeded = resolved.iter().filter(|item| item.is_resolved()).count();
        info!(
            "路程距离解析完成: {}/{} 成功 (路由服务: {})",
            succeeded,
            resolved.len(),
            self.routing.name()
        );

        resolved
    }

    async fn resolve_entry(
        &self,
        permits: &Semaphore,
        target: Location,
        entry: &ShortlistEntry,
    ) -> ResolvedCandidate {
        let destination = entry.candidate.location;
        let operation_name = format!("技术员 {} 路程查询", entry.candidate.id);

        let outcome = retry_with_backoff(
            &self.retry_policy,
            &operation_name,
            RoutingError::is_transient,
            |_attempt| self.query_once(permits, target, destination),
        )
        .await;

        metrics::record_routing_retries(outcome.attempts.saturating_sub(1));

        let accurate_km = match outcome.result {
            Ok(distance_km) => {
                debug!(
                    "技术员 {} 路程距离 {:.3}km (直线 {:.3}km)",
                    entry.candidate.id, distance_km, entry.great_circle_km
                );
                Ok(distance_km)
            }
            Err(error) => {
                warn!(
                    "技术员 {} 路程查询失败 ({} 次尝试): {}",
                    entry.candidate.id, outcome.attempts, error
                );
                Err(ResolutionFailure {
                    error,
                    attempts: outcome.attempts,
                })
            }
        };

        ResolvedCandidate {
            entry: entry.clone(),
            accurate_km,
        }
    }

    /// 单次查询：持有许可期间调用路由服务，退避等待时不占用许可
    async fn query_once(
        &self,
        permits: &Semaphore,
        origin: Location,
        destination: Location,
    ) -> Result<f64, RoutingError> {
        let _permit = permits
            .acquire()
            .await
            .map_err(|_| RoutingError::Transport("查询许可已关闭".to_string()))?;

        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.query_timeout,
            self.routing.distance(origin, destination),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RoutingError::Timeout),
        };

        let result = result.and_then(|distance_km| {
            if distance_km.is_finite() && distance_km >= 0.0 {
                Ok(distance_km)
            } else {
                Err(RoutingError::MalformedResponse(format!(
                    "无效的路程距离: {distance_km}"
                )))
            }
        });

        metrics::record_routing_query(result.is_ok(), started.elapsed());
        result
    }
}
