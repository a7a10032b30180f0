use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use wonfx_core::errors::Result;
use wonfx_core::ingest::RateRepositoryTrait;
use wonfx_core::rates::RateRecord;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::fx_rates;

/// Database row for the `fx_rates` table; decimals travel as TEXT.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = fx_rates)]
pub struct RateRecordDB {
    pub base_date: String,
    pub base_time: Option<String>,
    pub currency_code: String,
    pub currency_name: Option<String>,
    pub deal_bas_r: String,
    pub ttb: String,
    pub tts: String,
    pub provider: String,
    pub raw: String,
    pub created_at: String,
}

impl From<&RateRecord> for RateRecordDB {
    fn from(record: &RateRecord) -> Self {
        Self {
            base_date: record.base_date.to_string(),
            base_time: record.base_time.clone(),
            currency_code: record.currency_code.clone(),
            currency_name: record.currency_name.clone(),
            deal_bas_r: record.deal_bas_r.to_string(),
            ttb: record.ttb.to_string(),
            tts: record.tts.to_string(),
            provider: record.provider.clone(),
            raw: record.raw.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

impl From<RateRecordDB> for RateRecord {
    fn from(row: RateRecordDB) -> Self {
        RateRecord {
            base_date: NaiveDate::parse_from_str(&row.base_date, "%Y-%m-%d")
                .unwrap_or_default(),
            base_time: row.base_time,
            currency_code: row.currency_code,
            currency_name: row.currency_name,
            deal_bas_r: Decimal::from_str(&row.deal_bas_r).unwrap_or(Decimal::ZERO),
            ttb: Decimal::from_str(&row.ttb).unwrap_or(Decimal::ZERO),
            tts: Decimal::from_str(&row.tts).unwrap_or(Decimal::ZERO),
            provider: row.provider,
            raw: serde_json::from_str(&row.raw).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[derive(Clone)]
pub struct RateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// All stored observations for one calendar date, ordered by currency.
    pub fn get_rates_for_date(&self, date: NaiveDate) -> Result<Vec<RateRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = fx_rates::table
            .filter(fx_rates::base_date.eq(date.to_string()))
            .order_by(fx_rates::currency_code.asc())
            .load::<RateRecordDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(RateRecord::from).collect())
    }
}

#[async_trait]
impl RateRepositoryTrait for RateRepository {
    async fn upsert_daily_rates(&self, records: Vec<RateRecord>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let mut written = 0;
                for record in &records {
                    let row = RateRecordDB::from(record);
                    written += diesel::insert_into(fx_rates::table)
                        .values(&row)
                        .on_conflict((
                            fx_rates::base_date,
                            fx_rates::currency_code,
                            fx_rates::provider,
                        ))
                        .do_update()
                        .set((
                            fx_rates::base_time.eq(row.base_time.clone()),
                            fx_rates::currency_name.eq(row.currency_name.clone()),
                            fx_rates::deal_bas_r.eq(row.deal_bas_r.clone()),
                            fx_rates::ttb.eq(row.ttb.clone()),
                            fx_rates::tts.eq(row.tts.clone()),
                            fx_rates::raw.eq(row.raw.clone()),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                log::debug!("Upserted {} exchange-rate rows", written);
                Ok(written)
            })
            .await
    }
}
