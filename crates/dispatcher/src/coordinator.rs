//! 派单协调器
//!
//! 串联候选人目录、预筛、距离解析、选择和持久化：
//!
//! ```text
//! Started → Shortlisted → Resolved → Selected → Committed
//!    └──────────┴────────────┴──────────┴──────► Failed
//! ```
//!
//! 协调器不做幂等处理：同一任务重复调用会产生多条派单记录。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use techdispatch_core::{
    config::DispatchConfig,
    errors::{DispatchError, Result},
    models::{Assignment, DispatchStage, Task},
    traits::{AssignmentStore, CandidateDirectory, RoutingCapability},
};

use crate::geo_prefilter;
use crate::metrics;
use crate::ranker::{self, Selection, Winner};
use crate::resolver::DistanceResolver;

pub struct DispatchCoordinator {
    directory: Arc<dyn CandidateDirectory>,
    store: Arc<dyn AssignmentStore>,
    resolver: DistanceResolver,
    config: DispatchConfig,
}

impl DispatchCoordinator {
    pub fn new(
        directory: Arc<dyn CandidateDirectory>,
        routing: Arc<dyn RoutingCapability>,
        store: Arc<dyn AssignmentStore>,
        config: DispatchConfig,
    ) -> Self {
        let resolver = DistanceResolver::new(routing, &config);
        Self {
            directory,
            store,
            resolver,
            config,
        }
    }

    /// 为任务选出最合适的技术员并提交派单记录
    ///
    /// 成功时恰好产生一条派单记录。失败按类型区分：
    /// `NoCandidates`、`ResolutionExhausted`、`Persistence`、`DeadlineExceeded` 等。
    /// 持久化失败不在内部重试，是否重新派单由调用方决定。
    pub async fn dispatch(&self, task: &Task) -> Result<Assignment> {
        let attempt_id = Uuid::new_v4();
        let span = info_span!("dispatch", task_id = task.id, %attempt_id);

        async {
            let started = Instant::now();
            let result = self.run(task).await;

            match &result {
                Ok(assignment) => {
                    info!(
                        "任务 {} 派单成功: 技术员 {}，路程 {:.3}km，耗时 {}ms",
                        task.id,
                        assignment.candidate_id,
                        assignment.distance_km,
                        started.elapsed().as_millis()
                    );
                    metrics::record_dispatch("committed", started.elapsed());
                }
                Err(error) => {
                    warn!(
                        stage = %DispatchStage::Failed,
                        code = error.code(),
                        "任务 {} 派单失败: {}",
                        task.id,
                        error
                    );
                    metrics::record_dispatch(error.code(), started.elapsed());
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, task: &Task) -> Result<Assignment> {
        enter(DispatchStage::Started);
        task.location.validate()?;

        let timeout_ms = self.config.dispatch_timeout_ms;
        let winner = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.select_winner(task),
        )
        .await
        .map_err(|_| DispatchError::DeadlineExceeded { timeout_ms })??;

        let assignment = Assignment::new(task.id, winner.candidate.id, winner.accurate_km);
        let committed = self
            .store
            .insert(&assignment)
            .await
            .map_err(|error| match error {
                DispatchError::Persistence(_) => error,
                other => DispatchError::Persistence(other.to_string()),
            })?;
        enter(DispatchStage::Committed);

        Ok(committed)
    }

    /// 提交前的阶段，整体受派单总超时约束
    async fn select_winner(&self, task: &Task) -> Result<Winner> {
        let candidates = self
            .directory
            .list_active()
            .await
            .map_err(|error| match error {
                DispatchError::Directory(_) => error,
                other => DispatchError::Directory(other.to_string()),
            })?;

        let shortlist =
            geo_prefilter::shortlist(&task.location, &candidates, self.config.shortlist_size);
        if shortlist.is_empty() {
            return Err(DispatchError::NoCandidates);
        }
        enter(DispatchStage::Shortlisted);

        let resolved = self.resolver.resolve(task.location, &shortlist).await;
        enter(DispatchStage::Resolved);

        match ranker::select(&resolved) {
            Selection::Winner(winner) => {
                enter(DispatchStage::Selected);
                Ok(winner)
            }
            Selection::NoneAvailable => Err(DispatchError::ResolutionExhausted {
                attempted: resolved.len(),
            }),
        }
    }
}

fn enter(stage: DispatchStage) {
    debug!(stage = %stage, "派单状态变更");
}
