use std::sync::Arc;
use std::time::Duration;

use techdispatch_core::config::{DispatchConfig, RetryConfig};
use techdispatch_core::errors::{DispatchError, RoutingError};
use techdispatch_dispatcher::DispatchCoordinator;
use techdispatch_testing_utils::{
    CandidateBuilder, MockAssignmentStore, MockCandidateDirectory,
    MockRoutingCapability, RoutingReply, TaskBuilder,
};

fn fast_config(shortlist_size: usize) -> DispatchConfig {
    DispatchConfig {
        shortlist_size,
        max_concurrent_queries: 5,
        query_timeout_ms: 200,
        dispatch_timeout_ms: 5_000,
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        },
    }
}

struct Fixture {
    directory: Arc<MockCandidateDirectory>,
    routing: Arc<MockRoutingCapability>,
    store: Arc<MockAssignmentStore>,
    coordinator: DispatchCoordinator,
}

fn fixture(
    directory: MockCandidateDirectory,
    routing: MockRoutingCapability,
    config: DispatchConfig,
) -> Fixture {
    let directory = Arc::new(directory);
    let routing = Arc::new(routing);
    let store = Arc::new(MockAssignmentStore::new());
    let coordinator =
        DispatchCoordinator::new(directory.clone(), routing.clone(), store.clone(), config);

    Fixture {
        directory,
        routing,
        store,
        coordinator,
    }
}

#[tokio::test]
async fn test_nearest_shortlisted_candidate_wins() {
    let a = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let b = CandidateBuilder::new().with_id(2).at(0.0, 2.0).build();
    let routing = MockRoutingCapability::new()
        .with_distance(a.location, 5.0)
        .with_distance(b.location, 1.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![a.clone(), b.clone()]),
        routing,
        fast_config(1),
    );
    let task = TaskBuilder::new().with_id(10).at(0.0, 0.0).build();

    let assignment = f.coordinator.dispatch(&task).await.unwrap();

    assert_eq!(assignment.task_id, 10);
    assert_eq!(assignment.candidate_id, 1);
    assert_eq!(assignment.distance_km, 5.0);
    assert!(assignment.id.is_some());
    assert_eq!(f.store.count(), 1);
    // B 不在短名单中，不应被查询
    assert_eq!(f.routing.calls_to(b.location), 0);
}

#[tokio::test]
async fn test_no_active_candidates_fails_without_routing_calls() {
    let inactive = CandidateBuilder::new().with_id(1).at(0.0, 1.0).inactive().build();
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![inactive]),
        MockRoutingCapability::new(),
        fast_config(5),
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(result, Err(DispatchError::NoCandidates)));
    assert_eq!(f.routing.total_calls(), 0);
    assert_eq!(f.store.count(), 0);
}

#[tokio::test]
async fn test_all_resolutions_failing_is_reported_as_exhausted() {
    let x = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let y = CandidateBuilder::new().with_id(2).at(0.0, 2.0).build();
    let unavailable = RoutingError::Upstream {
        status: 503,
        message: "unavailable".to_string(),
    };
    let routing = MockRoutingCapability::new()
        .with_failure(x.location, unavailable.clone())
        .with_failure(y.location, unavailable);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![x.clone(), y.clone()]),
        routing,
        fast_config(2),
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(
        result,
        Err(DispatchError::ResolutionExhausted { attempted: 2 })
    ));
    assert_eq!(f.routing.calls_to(x.location), 3);
    assert_eq!(f.routing.calls_to(y.location), 3);
    assert_eq!(f.store.count(), 0);
}

#[tokio::test]
async fn test_accurate_distance_tie_broken_by_great_circle_distance() {
    // X 约 3km，Y 约 1km，路程距离相同
    let x = CandidateBuilder::new().with_id(1).at(0.027, 0.0).build();
    let y = CandidateBuilder::new().with_id(2).at(0.009, 0.0).build();
    let routing = MockRoutingCapability::new()
        .with_distance(x.location, 10.0)
        .with_distance(y.location, 10.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![x, y]),
        routing,
        fast_config(2),
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let assignment = f.coordinator.dispatch(&task).await.unwrap();

    assert_eq!(assignment.candidate_id, 2);
    assert_eq!(assignment.distance_km, 10.0);
}

#[tokio::test]
async fn test_partial_resolution_picks_among_resolved() {
    let near = CandidateBuilder::new().with_id(1).at(0.0, 0.1).build();
    let far = CandidateBuilder::new().with_id(2).at(0.0, 0.5).build();
    let routing = MockRoutingCapability::new()
        .with_failure(
            near.location,
            RoutingError::Rejected {
                status: 404,
                message: "no route".to_string(),
            },
        )
        .with_distance(far.location, 80.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![near, far]),
        routing,
        fast_config(5),
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let assignment = f.coordinator.dispatch(&task).await.unwrap();

    assert_eq!(assignment.candidate_id, 2);
    assert_eq!(assignment.distance_km, 80.0);
}

#[tokio::test]
async fn test_invalid_task_location_is_rejected() {
    let candidate = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![candidate]),
        MockRoutingCapability::new(),
        fast_config(5),
    );
    let task = TaskBuilder::new().at(95.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(result, Err(DispatchError::InvalidLocation { .. })));
    assert_eq!(f.directory.call_count(), 0);
    assert_eq!(f.routing.total_calls(), 0);
}

#[tokio::test]
async fn test_directory_failure_is_reported() {
    let directory = MockCandidateDirectory::new();
    directory.fail_with("connection refused");
    let f = fixture(directory, MockRoutingCapability::new(), fast_config(5));
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(result, Err(DispatchError::Directory(_))));
    assert_eq!(f.routing.total_calls(), 0);
}

#[tokio::test]
async fn test_persistence_failure_is_distinct_and_not_retried() {
    let candidate = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let routing = MockRoutingCapability::new().with_distance(candidate.location, 4.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![candidate.clone()]),
        routing,
        fast_config(5),
    );
    f.store.fail_with("disk full");
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(result, Err(DispatchError::Persistence(_))));
    assert_eq!(f.routing.calls_to(candidate.location), 1);
    assert_eq!(f.store.count(), 0);
}

#[tokio::test]
async fn test_overall_deadline_cancels_outstanding_queries() {
    let candidate = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let routing =
        MockRoutingCapability::new().with_replies(candidate.location, vec![RoutingReply::Hang]);
    let mut config = fast_config(5);
    config.query_timeout_ms = 10_000;
    config.dispatch_timeout_ms = 50;
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![candidate]),
        routing,
        config,
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let result = f.coordinator.dispatch(&task).await;

    assert!(matches!(
        result,
        Err(DispatchError::DeadlineExceeded { timeout_ms: 50 })
    ));
    assert_eq!(f.routing.in_flight(), 0);
    assert_eq!(f.store.count(), 0);
}

#[tokio::test]
async fn test_repeated_dispatch_creates_separate_assignments() {
    let candidate = CandidateBuilder::new().with_id(7).at(0.0, 1.0).build();
    let routing = MockRoutingCapability::new().with_distance(candidate.location, 3.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![candidate]),
        routing,
        fast_config(5),
    );
    let task = TaskBuilder::new().with_id(1).at(0.0, 0.0).build();

    let first = f.coordinator.dispatch(&task).await.unwrap();
    let second = f.coordinator.dispatch(&task).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(f.store.count(), 2);
    assert_eq!(f.directory.call_count(), 2);
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let candidate = CandidateBuilder::new().with_id(3).at(0.0, 1.0).build();
    let routing = MockRoutingCapability::new()
        .with_latency(Duration::from_millis(10))
        .with_distance(candidate.location, 2.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![candidate]),
        routing,
        fast_config(5),
    );
    let first_task = TaskBuilder::new().with_id(1).at(0.0, 0.0).build();
    let second_task = TaskBuilder::new().with_id(2).at(0.0, 0.5).build();

    let (first, second) = tokio::join!(
        f.coordinator.dispatch(&first_task),
        f.coordinator.dispatch(&second_task)
    );

    assert_eq!(first.unwrap().task_id, 1);
    assert_eq!(second.unwrap().task_id, 2);
    assert_eq!(f.store.count(), 2);
}

#[tokio::test]
async fn test_candidates_are_reread_on_every_dispatch() {
    let first = CandidateBuilder::new().with_id(1).at(0.0, 1.0).build();
    let second = CandidateBuilder::new().with_id(2).at(0.0, 0.5).build();
    let routing = MockRoutingCapability::new()
        .with_distance(first.location, 9.0)
        .with_distance(second.location, 4.0);
    let f = fixture(
        MockCandidateDirectory::with_candidates(vec![first.clone()]),
        routing,
        fast_config(5),
    );
    let task = TaskBuilder::new().at(0.0, 0.0).build();

    let before = f.coordinator.dispatch(&task).await.unwrap();
    f.directory.set_candidates(vec![first, second]);
    let after = f.coordinator.dispatch(&task).await.unwrap();

    assert_eq!(before.candidate_id, 1);
    assert_eq!(after.candidate_id, 2);
}
