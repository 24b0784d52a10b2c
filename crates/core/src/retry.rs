//! 指数退避重试
//!
//! 对单个外部调用统一应用的重试策略：瞬时错误按指数退避重试，
//! 非瞬时错误立即返回。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::RetryConfig;

/// 重试策略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含首次调用）
    pub max_attempts: u32,
    /// 基础退避间隔
    pub base_delay: Duration,
    /// 最大退避间隔
    pub max_delay: Duration,
    /// 指数退避倍数
    pub backoff_multiplier: f64,
    /// 随机抖动范围（0.0-1.0）
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter_factor: config.jitter_factor,
        }
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重试前的退避间隔（不含抖动），`retry` 从1开始
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms = self.base_delay.as_secs_f64() * 1000.0;
        let max_ms = self.max_delay.as_secs_f64() * 1000.0;
        let delay_ms = (base_ms * self.backoff_multiplier.powi(exponent)).min(max_ms);

        if delay_ms.is_finite() && delay_ms > 0.0 {
            Duration::from_secs_f64(delay_ms / 1000.0)
        } else {
            Duration::ZERO
        }
    }

    /// 在退避间隔上叠加 `[1 - jitter, 1 + jitter]` 的随机系数
    pub fn jittered_delay(&self, retry: u32) -> Duration {
        let delay = self.backoff_delay(retry);
        let jitter = self.jitter_factor.clamp(0.0, 1.0);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }

        let scale = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
        delay.mul_f64(scale)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// 重试执行结果
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// 实际发起的尝试次数
    pub attempts: u32,
}

/// 按策略执行异步操作
///
/// `operation` 接收当前尝试序号（从1开始）。`is_transient` 返回 `false`
/// 的错误不会重试。
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_transient: P,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} 在第 {} 次尝试后成功", operation_name, attempt);
                }
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(error) if !is_transient(&error) => {
                debug!("{} 遇到不可重试错误: {}", operation_name, error);
                return RetryOutcome {
                    result: Err(error),
                    attempts: attempt,
                };
            }
            Err(error) if attempt >= max_attempts => {
                warn!(
                    "{} 重试 {} 次后仍然失败: {}",
                    operation_name, max_attempts, error
                );
                return RetryOutcome {
                    result: Err(error),
                    attempts: attempt,
                };
            }
            Err(error) => {
                let delay = policy.jittered_delay(attempt);
                debug!(
                    "{} 第 {} 次尝试失败: {}，{}ms 后重试",
                    operation_name,
                    attempt,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
