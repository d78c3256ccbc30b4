use sqlx::{PgConnection, PgPool};

use crate::domain::TableKind;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CurtailmentRow {
    pub crtn_tm: String,
    pub fcst_tm: String,
    pub lead_tm: String,
    pub fcst_minpw: f64,
    pub fcst_curt: f64,
}

pub async fn row_count(conn: &mut PgConnection, kind: TableKind) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table_name());
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(conn).await
}

/// Curtailment rows whose creation key falls on `day_key` (`YYYYMMDD`).
pub async fn curtailment_for_day(
    pool: &PgPool,
    day_key: &str,
) -> Result<Vec<CurtailmentRow>, sqlx::Error> {
    sqlx::query_as::<_, CurtailmentRow>(
        r#"
        SELECT
            crtn_tm,
            fcst_tm,
            lead_tm,
            fcst_minpw::float8 AS fcst_minpw,
            fcst_curt::float8  AS fcst_curt
        FROM REP_DATA_P2H_FCST_CURT_DA
        WHERE crtn_tm LIKE $1 || '%'
        ORDER BY crtn_tm, fcst_tm
        "#,
    )
    .bind(day_key)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{forecast_queries, schema};
    use crate::domain::{CurtailmentForecast, LeadTime, Record, Stamp};
    use time::macros::date;

    fn curtailment(min_power: f64) -> Record {
        let creation = Stamp::at_hour(date!(2031-01-02), 5);
        Record::Curt(CurtailmentForecast {
            creation,
            forecast: creation.plus_hours(1),
            lead_time: LeadTime::new(5, 0),
            min_power,
            curtailment: min_power + 1.0,
            registered_at: creation,
        })
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres"]
    async fn curtailment_upsert_keeps_latest_values() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = PgPool::connect(&url).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        schema::ensure_table(&mut conn, TableKind::Curt).await.unwrap();
        sqlx::query("DELETE FROM REP_DATA_P2H_FCST_CURT_DA WHERE crtn_tm LIKE '20310102%'")
            .execute(&mut *conn)
            .await
            .unwrap();

        forecast_queries::write_record(&mut conn, &curtailment(100.0)).await.unwrap();
        forecast_queries::write_record(&mut conn, &curtailment(250.5)).await.unwrap();

        let rows = curtailment_for_day(&pool, "20310102").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fcst_minpw, 250.5);
        assert_eq!(rows[0].fcst_curt, 251.5);
        assert!(row_count(&mut conn, TableKind::Curt).await.unwrap() >= 1);
    }
}
