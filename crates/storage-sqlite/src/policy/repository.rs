use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use wonfx_core::errors::Result;
use wonfx_core::ingest::PolicyRateRepositoryTrait;
use wonfx_core::policy::PolicyRateRecord;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::ecos_base_rate;

/// Database row for the `ecos_base_rate` table.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = ecos_base_rate)]
pub struct PolicyRateRecordDB {
    pub stat_code: String,
    pub stat_name: Option<String>,
    pub cycle: String,
    pub unit_name: Option<String>,
    pub time_period: String,
    pub data_value: Option<String>,
    pub raw: String,
    pub created_at: String,
}

impl From<&PolicyRateRecord> for PolicyRateRecordDB {
    fn from(record: &PolicyRateRecord) -> Self {
        Self {
            stat_code: record.stat_code.clone(),
            stat_name: record.stat_name.clone(),
            cycle: record.cycle.clone(),
            unit_name: record.unit_name.clone(),
            time_period: record.time_period.clone(),
            data_value: record.data_value.map(|v| v.to_string()),
            raw: record.raw.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

impl From<PolicyRateRecordDB> for PolicyRateRecord {
    fn from(row: PolicyRateRecordDB) -> Self {
        PolicyRateRecord {
            stat_code: row.stat_code,
            stat_name: row.stat_name,
            cycle: row.cycle,
            unit_name: row.unit_name,
            time_period: row.time_period,
            data_value: row
                .data_value
                .as_deref()
                .and_then(|v| Decimal::from_str(v).ok()),
            raw: serde_json::from_str(&row.raw).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[derive(Clone)]
pub struct PolicyRateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PolicyRateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Look up one stored observation by its uniqueness key.
    pub fn get_base_rate(
        &self,
        stat_code: &str,
        time_period: &str,
    ) -> Result<Option<PolicyRateRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = ecos_base_rate::table
            .find((stat_code, time_period))
            .first::<PolicyRateRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(PolicyRateRecord::from))
    }
}

#[async_trait]
impl PolicyRateRepositoryTrait for PolicyRateRepository {
    /// Optimistic path: assumes the (stat_code, time_period) key is fresh.
    /// A conflict surfaces as `DatabaseError::UniqueViolation` for the
    /// caller to classify.
    async fn insert_base_rate(&self, record: PolicyRateRecord) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let row = PolicyRateRecordDB::from(&record);
                let written = diesel::insert_into(ecos_base_rate::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(written)
            })
            .await
    }

    /// Pessimistic fallback: overwrite whatever row owns the key.
    async fn upsert_base_rate(&self, record: PolicyRateRecord) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let row = PolicyRateRecordDB::from(&record);
                let written = diesel::insert_into(ecos_base_rate::table)
                    .values(&row)
                    .on_conflict((ecos_base_rate::stat_code, ecos_base_rate::time_period))
                    .do_update()
                    .set((
                        ecos_base_rate::stat_name.eq(row.stat_name.clone()),
                        ecos_base_rate::cycle.eq(row.cycle.clone()),
                        ecos_base_rate::unit_name.eq(row.unit_name.clone()),
                        ecos_base_rate::data_value.eq(row.data_value.clone()),
                        ecos_base_rate::raw.eq(row.raw.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                log::debug!("Upserted base-rate row for {}", row.time_period);
                Ok(written)
            })
            .await
    }
}
