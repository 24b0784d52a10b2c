use serde::{Deserialize, Serialize};

/// 派单流程配置
///
/// 作为显式参数传入派单协调器，不从全局状态读取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// 预筛短名单大小 K
    pub shortlist_size: usize,
    /// 同时在途的路由查询上限
    pub max_concurrent_queries: usize,
    /// 单次路由查询超时（毫秒）
    pub query_timeout_ms: u64,
    /// 单次派单尝试的总超时（毫秒）
    pub dispatch_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            shortlist_size: 5,
            max_concurrent_queries: 5,
            query_timeout_ms: 15_000,
            dispatch_timeout_ms: 60_000,
            retry: RetryConfig::default(),
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.shortlist_size == 0 {
            return Err(anyhow::anyhow!("短名单大小必须大于0"));
        }

        if self.max_concurrent_queries == 0 {
            return Err(anyhow::anyhow!("最大并发查询数必须大于0"));
        }

        if self.query_timeout_ms == 0 {
            return Err(anyhow::anyhow!("路由查询超时时间必须大于0"));
        }

        if self.dispatch_timeout_ms < self.query_timeout_ms {
            return Err(anyhow::anyhow!(
                "派单总超时 ({}ms) 不能小于单次查询超时 ({}ms)",
                self.dispatch_timeout_ms,
                self.query_timeout_ms
            ));
        }

        self.retry.validate()
    }
}

/// 重试策略配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 最大尝试次数（包含首次调用）
    pub max_attempts: u32,
    /// 基础重试间隔（毫秒）
    pub base_delay_ms: u64,
    /// 最大重试间隔（毫秒）
    pub max_delay_ms: u64,
    /// 指数退避倍数
    pub backoff_multiplier: f64,
    /// 重试间隔的随机抖动范围（0.0-1.0）
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("最大尝试次数必须大于0"));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(anyhow::anyhow!("最大重试间隔不能小于基础重试间隔"));
        }

        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(anyhow::anyhow!(
                "退避倍数必须是不小于1.0的有限值: {}",
                self.backoff_multiplier
            ));
        }

        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(anyhow::anyhow!("抖动范围必须在0.0到1.0之间"));
        }

        Ok(())
    }
}
