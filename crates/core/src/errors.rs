use thiserror::Error;

/// 派单错误类型定义
///
/// 结构性失败（无候选人、距离解析耗尽、持久化失败）原样传递给调用方，
/// 调用方可以按变体区分处理。瞬时的路由错误只在 [`RoutingError`] 中出现，
/// 由距离解析器在本地重试吸收。
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },

    #[error("无效的坐标: ({latitude}, {longitude})")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("没有可用的技术员")]
    NoCandidates,

    #[error("所有候选技术员的路程距离解析均失败 (共 {attempted} 个)")]
    ResolutionExhausted { attempted: usize },

    #[error("派单结果持久化失败: {0}")]
    Persistence(String),

    #[error("候选技术员查询失败: {0}")]
    Directory(String),

    #[error("派单超时: 超过 {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl DispatchError {
    /// 稳定的机器可读错误码，用于HTTP响应和指标标签
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::TaskNotFound { .. } => "TASK_NOT_FOUND",
            DispatchError::InvalidLocation { .. } => "INVALID_LOCATION",
            DispatchError::NoCandidates => "NO_CANDIDATES",
            DispatchError::ResolutionExhausted { .. } => "RESOLUTION_EXHAUSTED",
            DispatchError::Persistence(_) => "PERSISTENCE_ERROR",
            DispatchError::Directory(_) => "DIRECTORY_ERROR",
            DispatchError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            DispatchError::Configuration(_) => "CONFIGURATION_ERROR",
            DispatchError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// 路由服务单次查询的错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    #[error("路由查询超时")]
    Timeout,

    #[error("路由服务连接错误: {0}")]
    Transport(String),

    #[error("路由服务异常: HTTP {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("路由服务拒绝请求: HTTP {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("路由服务响应格式错误: {0}")]
    MalformedResponse(String),

    #[error("无效的路由请求: {0}")]
    InvalidInput(String),
}

impl RoutingError {
    /// 根据HTTP状态码归类路由服务返回的错误
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 || status == 429 {
            RoutingError::Upstream { status, message }
        } else {
            RoutingError::Rejected { status, message }
        }
    }

    /// 是否为可重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RoutingError::Timeout | RoutingError::Transport(_) | RoutingError::Upstream { .. }
        )
    }
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, DispatchError>;
