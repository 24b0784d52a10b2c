//! OpenRouteService 路由客户端
//!
//! 请求格式：`GET {base_url}?start={lon},{lat}&end={lon},{lat}`，
//! API密钥放在 `Authorization` 头中。距离取自
//! `features[0].properties.summary.distance`（米），返回公里。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use techdispatch_core::{
    config::RoutingConfig, errors::RoutingError, models::Location, traits::RoutingCapability,
};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    distance: Option<f64>,
}

pub struct OpenRouteServiceClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl OpenRouteServiceClient {
    /// 单次请求的超时由调用方控制，这里只设置连接超时
    pub fn new(config: &RoutingConfig) -> Result<Self, RoutingError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| RoutingError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn coordinate(location: &Location) -> String {
        format!("{},{}", location.longitude, location.latitude)
    }
}

/// 解析路由服务响应体，返回公里数
pub(crate) fn parse_distance_km(body: &str) -> Result<f64, RoutingError> {
    let response: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| RoutingError::MalformedResponse(format!("响应不是合法JSON: {e}")))?;

    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::MalformedResponse("响应中没有路线".to_string()))?;

    let distance_m = feature
        .properties
        .and_then(|properties| properties.summary)
        .and_then(|summary| summary.distance)
        .ok_or_else(|| RoutingError::MalformedResponse("响应中缺少距离".to_string()))?;

    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(RoutingError::MalformedResponse(format!(
            "无效的距离: {distance_m}"
        )));
    }

    Ok(distance_m / 1000.0)
}

fn classify_transport_error(error: reqwest::Error) -> RoutingError {
    if error.is_timeout() {
        RoutingError::Timeout
    } else {
        RoutingError::Transport(error.to_string())
    }
}

#[async_trait]
impl RoutingCapability for OpenRouteServiceClient {
    async fn distance(
        &self,
        origin: Location,
        destination: Location,
    ) -> Result<f64, RoutingError> {
        if !origin.is_valid() || !destination.is_valid() {
            return Err(RoutingError::InvalidInput(format!(
                "坐标超出范围: {origin:?} -> {destination:?}"
            )));
        }

        let start = Self::coordinate(&origin);
        let end = Self::coordinate(&destination);

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("start", start.as_str()), ("end", end.as_str())])
            .header(header::AUTHORIZATION, &self.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            let message: String = body.chars().take(200).collect();
            return Err(RoutingError::from_status(status.as_u16(), message));
        }

        let distance_km = parse_distance_km(&body)?;
        debug!("路由查询 {} -> {}: {:.3}km", start, end, distance_km);
        Ok(distance_km)
    }

    fn name(&self) -> &str {
        "openrouteservice"
    }
}
