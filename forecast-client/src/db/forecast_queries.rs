use sqlx::{
    postgres::{PgArguments, PgConnection},
    query::Query,
    Postgres,
};

use crate::domain::{Record, VariantSpread};

const INSERT_LFD: &str = r#"
    INSERT INTO REP_DATA_RE_FCST_LFD_DA (
        CRTN_TM, FCST_TM, LEAD_TM, FCST_PROD_CD,
        FCST_QG01, FCST_QG02, FCST_QG03, FCST_QG04, FCST_QG05, FCST_QG06,
        FCST_QGEN, FCST_QGMX, FCST_QGMN, REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
"#;

const INSERT_GEN: &str = r#"
    INSERT INTO REP_DATA_RE_FCST_GEN_DA (
        PWR_EXC_TP_CD, FUEL_TP_CD, CRTN_TM, FCST_TM, LEAD_TM, FCST_PROD_CD,
        FCST_QG01, FCST_QG02, FCST_QG03, FCST_QG04, FCST_QG05, FCST_QG06,
        FCST_QGEN, FCST_QGMX, FCST_QGMN, FCST_CAPA, ESS_CHRG, ESS_DISC, ESS_CAPA,
        REG_DATE, UPD_DATE
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
        $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
    )
"#;

const INSERT_NWP: &str = r#"
    INSERT INTO REP_DATA_HG_FCST_NWP_DA (
        PWR_EXC_TP_CD, AREA_GRP_CD, AREA_GRP_ID, CRTN_TM, FCST_TM, LEAD_TM, FCST_PROD_CD,
        FCST_SRAD, FCST_TEMP, FCST_HUMI, FCST_WSPD, FCST_PSFC,
        REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
"#;

const INSERT_KPX: &str = r#"
    INSERT INTO REP_DATA_RE_KPX_JEJU_SUKUB_M (
        TM, SUPP_ABILITY, CURR_PWR_TOT, RENEW_PWR_TOT, RENEW_PWR_SOLAR, RENEW_PWR_WIND,
        REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

const UPSERT_CURT: &str = r#"
    INSERT INTO REP_DATA_P2H_FCST_CURT_DA (
        CRTN_TM, FCST_TM, LEAD_TM, FCST_MINPW, FCST_CURT, REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (CRTN_TM, FCST_TM)
    DO UPDATE SET
        LEAD_TM = EXCLUDED.LEAD_TM,
        FCST_MINPW = EXCLUDED.FCST_MINPW,
        FCST_CURT = EXCLUDED.FCST_CURT,
        REG_DATE = EXCLUDED.REG_DATE,
        UPD_DATE = EXCLUDED.UPD_DATE
"#;

const INSERT_HG_GEN: &str = r#"
    INSERT INTO REP_DATA_HG_FCST_GEN_GENT_DA (
        AREA_GRP_CD, AREA_GRP_ID, CRTN_TM, FCST_TM, LEAD_TM, FCST_PROD_CD,
        FCST_QGEN, FCST_CAPA, REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const INSERT_HG_MEAS: &str = r#"
    INSERT INTO REP_DATA_HG_MEAS_GEM_GENT_DA (
        TM, AREA_GRP_CD, AREA_GRP_ID, HGEN_PROD, HGEN_CAPA, REG_DATE, UPD_DATE
    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_spread<'q>(query: PgQuery<'q>, spread: &VariantSpread) -> PgQuery<'q> {
    let [qg01, qg02, qg03, qg04, qg05, qg06] = spread.variants;
    query
        .bind(qg01)
        .bind(qg02)
        .bind(qg03)
        .bind(qg04)
        .bind(qg05)
        .bind(qg06)
        .bind(spread.headline)
        .bind(spread.max)
        .bind(spread.min)
}

/// Build the insert (or, for curtailment, upsert) statement for one record.
pub fn write_query(record: &Record) -> PgQuery<'_> {
    match record {
        Record::Lfd(r) => {
            let q = sqlx::query(INSERT_LFD)
                .bind(r.creation.key())
                .bind(r.forecast.key())
                .bind(r.lead_time.to_string())
                .bind(r.product_code.as_str());
            bind_spread(q, &r.spread)
                .bind(r.registered_at.datetime())
                .bind(r.registered_at.datetime())
        }
        Record::Gen(r) => {
            let q = sqlx::query(INSERT_GEN)
                .bind(r.power_class.as_str())
                .bind(r.fuel.code())
                .bind(r.creation.key())
                .bind(r.forecast.key())
                .bind(r.lead_time.to_string())
                .bind(r.product_code.as_str());
            bind_spread(q, &r.spread)
                .bind(r.capacity)
                .bind(r.storage_charge)
                .bind(r.storage_discharge)
                .bind(r.storage_capacity)
                .bind(r.registered_at.datetime())
                .bind(r.registered_at.datetime())
        }
        Record::Nwp(r) => sqlx::query(INSERT_NWP)
            .bind(r.power_class.as_str())
            .bind(r.area_group.as_str())
            .bind(r.area_id.as_str())
            .bind(r.creation.key())
            .bind(r.forecast.key())
            .bind(r.lead_time.to_string())
            .bind(r.product_code.as_str())
            .bind(r.irradiance)
            .bind(r.temperature)
            .bind(r.humidity)
            .bind(r.wind_speed)
            .bind(r.pressure)
            .bind(r.registered_at.datetime())
            .bind(r.registered_at.datetime()),
        Record::Kpx(r) => sqlx::query(INSERT_KPX)
            .bind(r.observed.key())
            .bind(r.supply_capability)
            .bind(r.current_load)
            .bind(r.renewable_total)
            .bind(r.renewable_solar)
            .bind(r.renewable_wind)
            .bind(r.registered_at.datetime())
            .bind(r.registered_at.datetime()),
        Record::Curt(r) => sqlx::query(UPSERT_CURT)
            .bind(r.creation.key())
            .bind(r.forecast.key())
            .bind(r.lead_time.to_string())
            .bind(r.min_power)
            .bind(r.curtailment)
            .bind(r.registered_at.datetime())
            .bind(r.registered_at.datetime()),
        Record::HgGen(r) => sqlx::query(INSERT_HG_GEN)
            .bind(r.area_group.code())
            .bind(r.area_id.as_str())
            .bind(r.creation.key())
            .bind(r.forecast.key())
            .bind(r.lead_time.to_string())
            .bind(r.product_code.as_str())
            .bind(r.production)
            .bind(r.capacity)
            .bind(r.registered_at.datetime())
            .bind(r.registered_at.datetime()),
        Record::HgMeas(r) => sqlx::query(INSERT_HG_MEAS)
            .bind(r.observed.key())
            .bind(r.area_group.code())
            .bind(r.area_id.as_str())
            .bind(r.production)
            .bind(r.capacity)
            .bind(r.registered_at.datetime())
            .bind(r.registered_at.datetime()),
    }
}

/// Write one record, returning the affected row count.
pub async fn write_record(conn: &mut PgConnection, record: &Record) -> Result<u64, sqlx::Error> {
    let result = write_query(record).execute(conn).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(sql: &str) -> usize {
        (1..=32).filter(|n| sql.contains(&format!("${n}"))).count()
    }

    #[test]
    fn placeholder_counts_match_column_lists() {
        assert_eq!(placeholders(INSERT_LFD), 15);
        assert_eq!(placeholders(INSERT_GEN), 21);
        assert_eq!(placeholders(INSERT_NWP), 14);
        assert_eq!(placeholders(INSERT_KPX), 8);
        assert_eq!(placeholders(UPSERT_CURT), 7);
        assert_eq!(placeholders(INSERT_HG_GEN), 10);
        assert_eq!(placeholders(INSERT_HG_MEAS), 7);
    }

    #[test]
    fn only_curtailment_statement_upserts() {
        assert!(UPSERT_CURT.contains("ON CONFLICT (CRTN_TM, FCST_TM)"));
        for sql in [INSERT_LFD, INSERT_GEN, INSERT_NWP, INSERT_KPX, INSERT_HG_GEN, INSERT_HG_MEAS] {
            assert!(!sql.contains("ON CONFLICT"));
        }
    }
}
