use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing::info;

use techdispatch_api::{create_app, AppState};
use techdispatch_core::config::AppConfig;
use techdispatch_dispatcher::DispatchCoordinator;
use techdispatch_infrastructure::{
    DatabaseManager, OpenRouteServiceClient, PostgresAssignmentStore, PostgresCandidateDirectory,
    PostgresTaskRepository,
};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    database: Arc<DatabaseManager>,
    state: AppState,
}

impl Application {
    /// 创建数据库连接、路由客户端和派单协调器
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let database = Arc::new(
            DatabaseManager::new(&config.database)
                .await
                .context("创建数据库连接池失败")?,
        );
        if config.database.run_migrations {
            database.migrate().await.context("数据表初始化失败")?;
        }

        let pool = database.pool().clone();
        let routing = Arc::new(
            OpenRouteServiceClient::new(&config.routing).context("创建路由服务客户端失败")?,
        );
        let store = Arc::new(PostgresAssignmentStore::new(pool.clone()));

        let coordinator = Arc::new(DispatchCoordinator::new(
            Arc::new(PostgresCandidateDirectory::new(pool.clone())),
            routing,
            store.clone(),
            config.dispatch.clone(),
        ));

        let metrics = if config.observability.metrics_enabled {
            Some(install_metrics_recorder()?)
        } else {
            None
        };

        let state = AppState {
            task_repo: Arc::new(PostgresTaskRepository::new(pool)),
            assignment_store: store,
            coordinator,
            health: database.clone(),
            metrics,
        };

        Ok(Self {
            config,
            database,
            state,
        })
    }

    /// 启动HTTP服务，`shutdown` 完成后停止接收新请求并关闭连接池
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;
        info!("API服务器监听地址: {}", bind_address);

        let app = create_app(self.state, &self.config.api);
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("API服务器运行失败");

        self.database.close().await;
        info!("数据库连接池已关闭");

        served
    }
}

fn install_metrics_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("安装Prometheus指标记录器失败")
}
