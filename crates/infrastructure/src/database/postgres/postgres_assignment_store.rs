use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use techdispatch_core::{
    errors::{DispatchError, Result},
    models::Assignment,
    traits::AssignmentStore,
};

/// PostgreSQL 派单记录存储，只追加
pub struct PostgresAssignmentStore {
    pool: PgPool,
}

impl PostgresAssignmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_assignment(row: &PgRow) -> Result<Assignment> {
        let id: i32 = row.try_get("id")?;
        let task_id: i32 = row.try_get("cust_id")?;
        let candidate_id: i32 = row.try_get("tech_id")?;
        Ok(Assignment {
            id: Some(i64::from(id)),
            task_id: i64::from(task_id),
            candidate_id: i64::from(candidate_id),
            distance_km: row.try_get("distance_km")?,
            assigned_at: row.try_get("assigned_at")?,
        })
    }
}

#[async_trait]
impl AssignmentStore for PostgresAssignmentStore {
    async fn insert(&self, assignment: &Assignment) -> Result<Assignment> {
        let row = sqlx::query(
            r#"
            INSERT INTO public.assignments (cust_id, tech_id, distance_km)
            VALUES ($1, $2, $3)
            RETURNING id, assigned_at
            "#,
        )
        .bind(assignment.task_id)
        .bind(assignment.candidate_id)
        .bind(assignment.distance_km)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DispatchError::Persistence(e.to_string()))?;

        let id: i32 = row
            .try_get("id")
            .map_err(|e| DispatchError::Persistence(e.to_string()))?;
        let assigned_at: DateTime<Utc> = row
            .try_get("assigned_at")
            .map_err(|e| DispatchError::Persistence(e.to_string()))?;

        debug!(
            "派单记录已写入: id={}, 任务 {} -> 技术员 {}",
            id, assignment.task_id, assignment.candidate_id
        );

        Ok(Assignment {
            id: Some(i64::from(id)),
            assigned_at,
            ..assignment.clone()
        })
    }

    async fn list(&self) -> Result<Vec<Assignment>> {
        let rows = sqlx::query(
            "SELECT id, cust_id, tech_id, distance_km, assigned_at FROM public.assignments ORDER BY assigned_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DispatchError::Database)?;

        rows.iter().map(Self::row_to_assignment).collect()
    }
}
