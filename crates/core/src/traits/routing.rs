use async_trait::async_trait;

use crate::errors::RoutingError;
use crate::models::Location;

/// 外部路由服务能力
///
/// 返回两点之间的实际路程距离（公里）。调用没有副作用，可以安全重复调用；
/// 单次调用的超时和重试由调用方负责。
#[async_trait]
pub trait RoutingCapability: Send + Sync {
    async fn distance(
        &self,
        origin: Location,
        destination: Location,
    ) -> std::result::Result<f64, RoutingError>;

    fn name(&self) -> &str;
}
