use std::sync::Arc;
use std::time::Duration;

use techdispatch_core::config::{DispatchConfig, RetryConfig};
use techdispatch_core::errors::RoutingError;
use techdispatch_core::models::ShortlistEntry;
use techdispatch_dispatcher::{shortlist, DistanceResolver};
use techdispatch_testing_utils::{location, CandidateBuilder, MockRoutingCapability, RoutingReply};

fn fast_config() -> DispatchConfig {
    DispatchConfig {
        shortlist_size: 5,
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

fn entries(count: usize) -> Vec<ShortlistEntry> {
    let candidates: Vec<_> = (1..=count as i64)
        .map(|id| {
            CandidateBuilder::new()
                .with_id(id)
                .at(40.0 + id as f64 * 0.01, -74.0)
                .build()
        })
        .collect();
    shortlist(&location(40.0, -74.0), &candidates, count)
}

#[tokio::test]
async fn test_resolve_keeps_positional_correspondence() {
    let shortlist = entries(4);
    let mut routing = MockRoutingCapability::new();
    for entry in &shortlist {
        routing = routing.with_distance(entry.candidate.location, entry.candidate.id as f64 * 10.0);
    }
    let resolver = DistanceResolver::new(Arc::new(routing), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    assert_eq!(resolved.len(), shortlist.len());
    for (entry, item) in shortlist.iter().zip(&resolved) {
        assert_eq!(item.entry.candidate.id, entry.candidate.id);
        assert_eq!(item.accurate_km, Ok(entry.candidate.id as f64 * 10.0));
    }
}

#[tokio::test]
async fn test_resolve_empty_shortlist_makes_no_calls() {
    let routing = Arc::new(MockRoutingCapability::new());
    let resolver = DistanceResolver::new(routing.clone(), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &[]).await;

    assert!(resolved.is_empty());
    assert_eq!(routing.total_calls(), 0);
}

#[tokio::test]
async fn test_partial_failure_does_not_cancel_siblings() {
    let shortlist = entries(3);
    let routing = MockRoutingCapability::new()
        .with_distance(shortlist[0].candidate.location, 5.0)
        .with_failure(
            shortlist[1].candidate.location,
            RoutingError::Rejected {
                status: 404,
                message: "no route".to_string(),
            },
        )
        .with_distance(shortlist[2].candidate.location, 7.0);
    let resolver = DistanceResolver::new(Arc::new(routing), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    assert_eq!(resolved.len(), 3);
    assert!(resolved[0].is_resolved());
    assert!(!resolved[1].is_resolved());
    assert!(resolved[2].is_resolved());
}

#[tokio::test]
async fn test_non_transient_failure_is_not_retried() {
    let shortlist = entries(1);
    let destination = shortlist[0].candidate.location;
    let routing = Arc::new(MockRoutingCapability::new().with_failure(
        destination,
        RoutingError::Rejected {
            status: 400,
            message: "bad coordinates".to_string(),
        },
    ));
    let resolver = DistanceResolver::new(routing.clone(), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    let failure = resolved[0].accurate_km.as_ref().unwrap_err();
    assert_eq!(failure.attempts, 1);
    assert_eq!(routing.calls_to(destination), 1);
}

#[tokio::test]
async fn test_transient_failure_retries_until_success() {
    let shortlist = entries(1);
    let destination = shortlist[0].candidate.location;
    let routing = Arc::new(MockRoutingCapability::new().with_replies(
        destination,
        vec![
            RoutingReply::Fail(RoutingError::Upstream {
                status: 503,
                message: "unavailable".to_string(),
            }),
            RoutingReply::Fail(RoutingError::Transport("connection reset".to_string())),
            RoutingReply::Distance(12.5),
        ],
    ));
    let resolver = DistanceResolver::new(routing.clone(), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    assert_eq!(resolved[0].accurate_km, Ok(12.5));
    assert_eq!(routing.calls_to(destination), 3);
}

#[tokio::test]
async fn test_transient_failure_gives_up_after_max_attempts() {
    let shortlist = entries(1);
    let destination = shortlist[0].candidate.location;
    let routing = Arc::new(MockRoutingCapability::new().with_failure(
        destination,
        RoutingError::Upstream {
            status: 502,
            message: "bad gateway".to_string(),
        },
    ));
    let resolver = DistanceResolver::new(routing.clone(), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    let failure = resolved[0].accurate_km.as_ref().unwrap_err();
    assert_eq!(failure.attempts, 3);
    assert!(matches!(failure.error, RoutingError::Upstream { status: 502, .. }));
    assert_eq!(routing.calls_to(destination), 3);
}

#[tokio::test]
async fn test_query_timeout_counts_as_transient_failure() {
    let shortlist = entries(1);
    let destination = shortlist[0].candidate.location;
    let routing = Arc::new(
        MockRoutingCapability::new().with_replies(destination, vec![RoutingReply::Hang]),
    );
    let mut config = fast_config();
    config.query_timeout_ms = 20;
    let resolver = DistanceResolver::new(routing.clone(), &config);

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    let failure = resolved[0].accurate_km.as_ref().unwrap_err();
    assert_eq!(failure.error, RoutingError::Timeout);
    assert_eq!(failure.attempts, 3);
    assert_eq!(routing.in_flight(), 0);
}

#[tokio::test]
async fn test_invalid_distance_is_treated_as_malformed() {
    let shortlist = entries(2);
    let routing = MockRoutingCapability::new()
        .with_distance(shortlist[0].candidate.location, f64::NAN)
        .with_distance(shortlist[1].candidate.location, -3.0);
    let resolver = DistanceResolver::new(Arc::new(routing), &fast_config());

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    assert_eq!(resolved.len(), 2);
    for item in &resolved {
        let failure = item.accurate_km.as_ref().unwrap_err();
        assert!(matches!(failure.error, RoutingError::MalformedResponse(_)));
        assert_eq!(failure.attempts, 1);
    }
}

#[tokio::test]
async fn test_in_flight_queries_are_bounded() {
    let shortlist = entries(8);
    let mut routing = MockRoutingCapability::new().with_latency(Duration::from_millis(20));
    for entry in &shortlist {
        routing = routing.with_distance(entry.candidate.location, 1.0);
    }
    let routing = Arc::new(routing);
    let mut config = fast_config();
    config.max_concurrent_queries = 2;
    let resolver = DistanceResolver::new(routing.clone(), &config);

    let resolved = resolver.resolve(location(40.0, -74.0), &shortlist).await;

    assert_eq!(resolved.len(), 8);
    assert!(resolved.iter().all(|item| item.is_resolved()));
    assert_eq!(routing.total_calls(), 8);
    assert!(routing.max_in_flight() <= 2);
    assert!(routing.max_in_flight() >= 1);
}

#[tokio::test]
async fn test_backoff_does_not_hold_query_permit() {
    let shortlist = entries(2);
    let retrying = shortlist[0].candidate.location;
    let healthy = shortlist[1].candidate.location;
    let routing = Arc::new(
        MockRoutingCapability::new()
            .with_replies(
                retrying,
                vec![
                    RoutingReply::Fail(RoutingError::Upstream {
                        status: 503,
                        message: "unavailable".to_string(),
                    }),
                    RoutingReply::Distance(4.0),
                ],
            )
            .with_distance(healthy, 2.0),
    );
    let mut config = fast_config();
    config.max_concurrent_queries = 1;
    config.retry.base_delay_ms = 300;
    config.retry.max_delay_ms = 1_000;
    let resolver = DistanceResolver::new(routing.clone(), &config);

    // 在第一个条目的退避结束之前截止
    let outcome = tokio::time::timeout(
        Duration::from_millis(150),
        resolver.resolve(location(40.0, -74.0), &shortlist),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(routing.calls_to(retrying), 1);
    assert_eq!(routing.calls_to(healthy), 1);
    assert_eq!(routing.in_flight(), 0);
}

#[tokio::test]
async fn test_limit_is_per_resolve_call() {
    let shortlist = entries(2);
    let mut routing = MockRoutingCapability::new().with_latency(Duration::from_millis(50));
    for entry in &shortlist {
        routing = routing.with_distance(entry.candidate.location, 1.0);
    }
    let routing = Arc::new(routing);
    let mut config = fast_config();
    config.max_concurrent_queries = 1;
    let resolver = DistanceResolver::new(routing.clone(), &config);

    let target = location(40.0, -74.0);
    let (first, second) = tokio::join!(
        resolver.resolve(target, &shortlist[..1]),
        resolver.resolve(target, &shortlist[1..]),
    );

    assert!(first[0].is_resolved());
    assert!(second[0].is_resolved());
    assert_eq!(routing.max_in_flight(), 2);
}

#[tokio::test]
async fn test_dropping_resolve_releases_in_flight_queries() {
    let shortlist = entries(3);
    let mut routing = MockRoutingCapability::new();
    for entry in &shortlist {
        routing = routing.with_replies(entry.candidate.location, vec![RoutingReply::Hang]);
    }
    let routing = Arc::new(routing);
    let mut config = fast_config();
    config.query_timeout_ms = 60_000;
    let resolver = DistanceResolver::new(routing.clone(), &config);

    let outcome = tokio::time::timeout(
        Duration::from_millis(30),
        resolver.resolve(location(40.0, -74.0), &shortlist),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(routing.total_calls(), 3);
    assert_eq!(routing.in_flight(), 0);
}
