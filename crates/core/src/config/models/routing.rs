use serde::{Deserialize, Serialize};

/// 外部路由服务配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org/v2/directions/driving-car".to_string(),
            api_key: String::new(),
            connect_timeout_ms: 5000,
        }
    }
}

// api_key 不能出现在日志里
impl std::fmt::Debug for RoutingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("路由服务地址必须是HTTP(S) URL: {}", self.base_url));
        }

        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("路由服务API密钥不能为空"));
        }

        if self.connect_timeout_ms == 0 {
            return Err(anyhow::anyhow!("路由服务连接超时时间必须大于0"));
        }

        Ok(())
    }
}
