use forecast_client::{
    db::{forecast_queries, report_queries, schema},
    domain::{Record, TableKind},
};
use sqlx::{
    postgres::{PgConnection, PgPool, PgPoolOptions},
    Connection,
};

use super::{ForecastStore, KindOutcome, StoreError, TableClearOutcome};
use crate::config::DatabaseConfig;

pub struct PgForecastStore {
    pool: PgPool,
}

impl PgForecastStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the pool without touching the network; the first operation
    /// that needs a connection surfaces an unreachable server.
    pub fn connect_lazy(cfg: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout())
            .connect_lazy_with(cfg.connect_options());
        Self::new(pool)
    }
}

/// Any failure to get a connection, server-side rejections included
/// (bad credentials, unknown database, too many clients), means the store
/// is unavailable.
fn acquire_error(e: sqlx::Error) -> StoreError {
    StoreError::Connection(e.to_string())
}

fn tx_error(e: sqlx::Error) -> StoreError {
    StoreError::Transaction(e.to_string())
}

async fn count_and_truncate(conn: &mut PgConnection, kind: TableKind) -> Result<u64, sqlx::Error> {
    let rows = report_queries::row_count(&mut *conn, kind).await?;
    schema::truncate_table(conn, kind).await?;
    Ok(rows.max(0) as u64)
}

#[async_trait::async_trait]
impl ForecastStore for PgForecastStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(acquire_error)?;
        for kind in TableKind::ALL {
            schema::ensure_table(&mut conn, kind)
                .await
                .map_err(|e| StoreError::Schema(format!("{}: {e}", kind.table_name())))?;
        }
        tracing::debug!("schema ensured");
        Ok(())
    }

    async fn write_kind(&self, kind: TableKind, records: &[Record]) -> Result<KindOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(acquire_error)?;
        let mut outcome = KindOutcome::default();

        for (index, record) in records.iter().enumerate() {
            // Nested begin is a savepoint; a failed record rolls back alone.
            let mut savepoint = Connection::begin(&mut *tx).await.map_err(tx_error)?;
            match forecast_queries::write_record(&mut savepoint, record).await {
                Ok(_) => {
                    savepoint.commit().await.map_err(tx_error)?;
                    outcome.written += 1;
                }
                Err(e) => {
                    let e = StoreError::Write(e.to_string());
                    tracing::warn!(table = %kind, index, error = %e, "record write failed, rolled back to savepoint");
                    savepoint.rollback().await.map_err(tx_error)?;
                    outcome.failed += 1;
                }
            }
        }

        tx.commit().await.map_err(tx_error)?;
        Ok(outcome)
    }

    async fn clear_tables(&self, kinds: &[TableKind]) -> Result<Vec<TableClearOutcome>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(acquire_error)?;
        let mut outcomes = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let mut savepoint = Connection::begin(&mut *tx).await.map_err(tx_error)?;
            let result = match count_and_truncate(&mut savepoint, kind).await {
                Ok(rows) => {
                    savepoint.commit().await.map_err(tx_error)?;
                    Ok(rows)
                }
                Err(e) => {
                    savepoint.rollback().await.map_err(tx_error)?;
                    Err(e.to_string())
                }
            };
            outcomes.push(TableClearOutcome { kind, result });
        }

        tx.commit().await.map_err(tx_error)?;
        Ok(outcomes)
    }
}
