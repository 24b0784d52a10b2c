use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use techdispatch_core::{config::DatabaseConfig, errors, traits::HealthCheck};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS public.customers (
        customerid SERIAL PRIMARY KEY,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS public.technicians (
        technicianid SERIAL PRIMARY KEY,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        is_active BOOLEAN DEFAULT TRUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS public.assignments (
        id SERIAL PRIMARY KEY,
        cust_id INTEGER NOT NULL REFERENCES public.customers(customerid),
        tech_id INTEGER NOT NULL REFERENCES public.technicians(technicianid),
        distance_km DOUBLE PRECISION NOT NULL,
        assigned_at TIMESTAMP WITH TIME ZONE DEFAULT now()
    )
    "#,
];

/// 数据库连接池管理器
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// 创建新的数据库管理器
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// 使用已有的连接池
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 创建数据表（幂等）
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("数据表检查完成");
        Ok(())
    }

    /// 检查数据库连接健康状态
    pub async fn health_check(&self) -> errors::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 关闭数据库连接池
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl HealthCheck for DatabaseManager {
    async fn check(&self) -> errors::Result<()> {
        self.health_check().await
    }
}
