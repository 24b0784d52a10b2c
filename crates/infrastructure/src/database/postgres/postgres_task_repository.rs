use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use techdispatch_core::{
    errors::{DispatchError, Result},
    models::{Location, Task},
    traits::TaskRepository,
};

/// PostgreSQL 任务仓储，任务即 `customers` 表中的客户请求
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &PgRow) -> Result<Task> {
        let id: i32 = row.try_get("customerid")?;
        Ok(Task {
            id: i64::from(id),
            location: Location {
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
            },
        })
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        let row = sqlx::query(
            "SELECT customerid, latitude, longitude FROM public.customers WHERE customerid = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DispatchError::Database)?;

        let task = row.as_ref().map(Self::row_to_task).transpose()?;
        debug!("查询任务 {}: {}", id, if task.is_some() { "找到" } else { "不存在" });
        Ok(task)
    }
}
