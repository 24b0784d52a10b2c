//! Mock implementations for all collaborator traits
//!
//! 内存实现，单元测试和集成测试不需要真实数据库或外部路由服务。

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use techdispatch_core::errors::{DispatchError, Result, RoutingError};
use techdispatch_core::models::{Assignment, Candidate, Location, Task};
use techdispatch_core::traits::{
    AssignmentStore, CandidateDirectory, HealthCheck, RoutingCapability, TaskRepository,
};

/// Mock implementation of TaskRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<HashMap<i64, Task>>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let repo = Self::new();
        for task in tasks {
            repo.insert(task);
        }
        repo
    }

    pub fn insert(&self, task: Task) {
        self.tasks.lock().unwrap().insert(task.id, task);
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.tasks.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of CandidateDirectory for testing
#[derive(Debug, Clone, Default)]
pub struct MockCandidateDirectory {
    candidates: Arc<Mutex<Vec<Candidate>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCandidateDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        let directory = Self::new();
        directory.set_candidates(candidates);
        directory
    }

    pub fn set_candidates(&self, candidates: Vec<Candidate>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    /// 之后的查询都返回错误
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateDirectory for MockCandidateDirectory {
    async fn list_active(&self) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(DispatchError::Directory(message));
        }

        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .filter(|candidate| candidate.active)
            .cloned()
            .collect())
    }
}

/// Mock implementation of AssignmentStore for testing
#[derive(Debug, Clone)]
pub struct MockAssignmentStore {
    assignments: Arc<Mutex<Vec<Assignment>>>,
    next_id: Arc<Mutex<i64>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockAssignmentStore {
    pub fn new() -> Self {
        Self {
            assignments: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// 之后的写入都返回持久化错误
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn count(&self) -> usize {
        self.assignments.lock().unwrap().len()
    }

    pub fn get_all(&self) -> Vec<Assignment> {
        self.assignments.lock().unwrap().clone()
    }
}

impl Default for MockAssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentStore for MockAssignmentStore {
    async fn insert(&self, assignment: &Assignment) -> Result<Assignment> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(DispatchError::Persistence(message));
        }

        let mut next_id = self.next_id.lock().unwrap();
        let mut stored = assignment.clone();
        stored.id = Some(*next_id);
        stored.assigned_at = Utc::now();
        *next_id += 1;

        self.assignments.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Assignment>> {
        let mut assignments = self.get_all();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at).then(b.id.cmp(&a.id)));
        Ok(assignments)
    }
}

/// Mock 路由服务的单次应答
#[derive(Debug, Clone)]
pub enum RoutingReply {
    Distance(f64),
    Fail(RoutingError),
    /// 一直挂起，直到调用方超时或取消
    Hang,
}

type LocationKey = (u64, u64);

fn key(location: &Location) -> LocationKey {
    (location.latitude.to_bits(), location.longitude.to_bits())
}

/// 可编排应答的路由服务
///
/// 按目的地坐标配置应答序列，序列中的最后一个应答会被重复使用。
/// 同时记录调用次数和最大并发数。
#[derive(Debug, Clone)]
pub struct MockRoutingCapability {
    scripts: Arc<Mutex<HashMap<LocationKey, VecDeque<RoutingReply>>>>,
    calls_by_destination: Arc<Mutex<HashMap<LocationKey, usize>>>,
    latency: Duration,
    total_calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockRoutingCapability {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            calls_by_destination: Arc::new(Mutex::new(HashMap::new())),
            latency: Duration::ZERO,
            total_calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 每次调用的模拟延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_distance(self, destination: Location, distance_km: f64) -> Self {
        self.with_replies(destination, vec![RoutingReply::Distance(distance_km)])
    }

    pub fn with_failure(self, destination: Location, error: RoutingError) -> Self {
        self.with_replies(destination, vec![RoutingReply::Fail(error)])
    }

    pub fn with_replies(self, destination: Location, replies: Vec<RoutingReply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(key(&destination), replies.into_iter().collect());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, destination: Location) -> usize {
        self.calls_by_destination
            .lock()
            .unwrap()
            .get(&key(&destination))
            .copied()
            .unwrap_or(0)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, destination: &Location) -> RoutingReply {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&key(destination)) {
            Some(replies) if replies.len() > 1 => replies.pop_front().unwrap(),
            Some(replies) => replies
                .front()
                .cloned()
                .unwrap_or_else(|| RoutingReply::Fail(RoutingError::Rejected {
                    status: 404,
                    message: "no route".to_string(),
                })),
            None => RoutingReply::Fail(RoutingError::Rejected {
                status: 404,
                message: "no route".to_string(),
            }),
        }
    }
}

impl Default for MockRoutingCapability {
    fn default() -> Self {
        Self::new()
    }
}

/// 在途计数，被丢弃时（包括取消）自动递减
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn enter(in_flight: &Arc<AtomicUsize>, max_in_flight: &AtomicUsize) -> Self {
        let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(current, Ordering::SeqCst);
        Self {
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoutingCapability for MockRoutingCapability {
    async fn distance(
        &self,
        _origin: Location,
        destination: Location,
    ) -> std::result::Result<f64, RoutingError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_destination
            .lock()
            .unwrap()
            .entry(key(&destination))
            .or_insert(0) += 1;

        let _guard = InFlightGuard::enter(&self.in_flight, &self.max_in_flight);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.next_reply(&destination) {
            RoutingReply::Distance(distance_km) => Ok(distance_km),
            RoutingReply::Fail(error) => Err(error),
            RoutingReply::Hang => {
                std::future::pending::<()>().await;
                Err(RoutingError::Timeout)
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock health check
#[derive(Debug, Clone)]
pub struct MockHealthCheck {
    healthy: Arc<AtomicBool>,
}

impl MockHealthCheck {
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(healthy)),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthCheck for MockHealthCheck {
    async fn check(&self) -> Result<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DispatchError::Database(sqlx::Error::PoolTimedOut))
        }
    }
}
