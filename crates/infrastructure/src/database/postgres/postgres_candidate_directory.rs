use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use techdispatch_core::{
    errors::{DispatchError, Result},
    models::{Candidate, Location},
    traits::CandidateDirectory,
};

/// PostgreSQL 技术员目录
///
/// 每次调用都直接查询数据库，不做缓存。
pub struct PostgresCandidateDirectory {
    pool: PgPool,
}

impl PostgresCandidateDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_candidate(row: &PgRow) -> Result<Candidate> {
        let id: i32 = row.try_get("technicianid")?;
        Ok(Candidate {
            id: i64::from(id),
            location: Location {
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
            },
            active: true,
        })
    }
}

#[async_trait]
impl CandidateDirectory for PostgresCandidateDirectory {
    async fn list_active(&self) -> Result<Vec<Candidate>> {
        let rows = sqlx::query(
            "SELECT technicianid, latitude, longitude FROM public.technicians WHERE is_active = TRUE ORDER BY technicianid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DispatchError::Directory(e.to_string()))?;

        let candidates = rows
            .iter()
            .map(Self::row_to_candidate)
            .collect::<Result<Vec<_>>>()?;
        debug!("在岗技术员 {} 名", candidates.len());
        Ok(candidates)
    }
}
