//! 派单指标
//!
//! 通过 `metrics` 门面上报，由二进制程序安装的 Prometheus recorder 收集。
//! 未安装 recorder 时这些调用都是空操作。

use std::time::Duration;

use metrics::{counter, histogram};

pub const DISPATCH_ATTEMPTS_TOTAL: &str = "dispatch_attempts_total";
pub const DISPATCH_DURATION_SECONDS: &str = "dispatch_duration_seconds";
pub const ROUTING_QUERIES_TOTAL: &str = "dispatch_routing_queries_total";
pub const ROUTING_RETRIES_TOTAL: &str = "dispatch_routing_retries_total";
pub const ROUTING_QUERY_DURATION_SECONDS: &str = "dispatch_routing_query_duration_seconds";

pub(crate) fn record_dispatch(outcome: &'static str, elapsed: Duration) {
    counter!(DISPATCH_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(DISPATCH_DURATION_SECONDS, "outcome" => outcome).record(elapsed.as_secs_f64());
}

pub(crate) fn record_routing_query(success: bool, elapsed: Duration) {
    let result = if success { "success" } else { "failure" };
    counter!(ROUTING_QUERIES_TOTAL, "result" => result).increment(1);
    histogram!(ROUTING_QUERY_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

pub(crate) fn record_routing_retries(retries: u32) {
    if retries > 0 {
        counter!(ROUTING_RETRIES_TOTAL).increment(u64::from(retries));
    }
}
