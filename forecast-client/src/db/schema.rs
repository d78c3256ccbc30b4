use sqlx::PgConnection;

use crate::domain::TableKind;

// Keys are VARCHAR(12) `YYYYMMDDHHMM`; dashboards query on them as text.

const CREATE_LFD: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_RE_FCST_LFD_DA (
    id SERIAL PRIMARY KEY,
    CRTN_TM VARCHAR(12) NOT NULL,
    FCST_TM VARCHAR(12) NOT NULL,
    LEAD_TM VARCHAR(5) NOT NULL,
    FCST_PROD_CD VARCHAR(2) NOT NULL,
    FCST_QG01 DECIMAL(13,6),
    FCST_QG02 DECIMAL(13,6),
    FCST_QG03 DECIMAL(13,6),
    FCST_QG04 DECIMAL(13,6),
    FCST_QG05 DECIMAL(13,6),
    FCST_QG06 DECIMAL(13,6),
    FCST_QGEN DECIMAL(13,6),
    FCST_QGMX DECIMAL(13,6),
    FCST_QGMN DECIMAL(13,6),
    REG_DATE TIMESTAMP,
    UPD_DATE TIMESTAMP,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_GEN: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_RE_FCST_GEN_DA (
    PWR_EXC_TP_CD VARCHAR(2) NOT NULL,
    FUEL_TP_CD VARCHAR(20) NOT NULL,
    CRTN_TM VARCHAR(12) NOT NULL,
    FCST_TM VARCHAR(12) NOT NULL,
    LEAD_TM VARCHAR(5),
    FCST_PROD_CD VARCHAR(2),
    FCST_QG01 DECIMAL(13,6),
    FCST_QG02 DECIMAL(13,6),
    FCST_QG03 DECIMAL(13,6),
    FCST_QG04 DECIMAL(13,6),
    FCST_QG05 DECIMAL(13,6),
    FCST_QG06 DECIMAL(13,6),
    FCST_QGEN DECIMAL(13,6),
    FCST_QGMX DECIMAL(13,6),
    FCST_QGMN DECIMAL(13,6),
    FCST_CAPA DECIMAL(13,6),
    ESS_CHRG DECIMAL(13,6),
    ESS_DISC DECIMAL(13,6),
    ESS_CAPA DECIMAL(13,6),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (PWR_EXC_TP_CD, FUEL_TP_CD, CRTN_TM, FCST_TM)
)
"#;

const CREATE_NWP: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_HG_FCST_NWP_DA (
    PWR_EXC_TP_CD VARCHAR(2) NOT NULL,
    AREA_GRP_CD VARCHAR(20) NOT NULL,
    AREA_GRP_ID VARCHAR(20) NOT NULL,
    CRTN_TM VARCHAR(12) NOT NULL,
    FCST_TM VARCHAR(12) NOT NULL,
    LEAD_TM VARCHAR(5),
    FCST_PROD_CD VARCHAR(2),
    FCST_SRAD DECIMAL(10,6),
    FCST_TEMP DECIMAL(10,6),
    FCST_HUMI DECIMAL(10,6),
    FCST_WSPD DECIMAL(10,6),
    FCST_PSFC DECIMAL(10,6),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (PWR_EXC_TP_CD, AREA_GRP_CD, AREA_GRP_ID, CRTN_TM, FCST_TM)
)
"#;

const CREATE_KPX: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_RE_KPX_JEJU_SUKUB_M (
    TM VARCHAR(12) NOT NULL PRIMARY KEY,
    SUPP_ABILITY DECIMAL(18,5),
    CURR_PWR_TOT DECIMAL(18,5),
    RENEW_PWR_TOT DECIMAL(18,5),
    RENEW_PWR_SOLAR DECIMAL(18,5),
    RENEW_PWR_WIND DECIMAL(18,5),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_CURT: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_P2H_FCST_CURT_DA (
    CRTN_TM VARCHAR(12) NOT NULL,
    FCST_TM VARCHAR(12) NOT NULL,
    LEAD_TM VARCHAR(5) NOT NULL,
    FCST_MINPW DECIMAL(7,2),
    FCST_CURT DECIMAL(7,2),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (CRTN_TM, FCST_TM)
)
"#;

const CREATE_HG_GEN: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_HG_FCST_GEN_GENT_DA (
    AREA_GRP_CD VARCHAR(20) NOT NULL,
    AREA_GRP_ID VARCHAR(20) NOT NULL,
    CRTN_TM VARCHAR(12) NOT NULL,
    FCST_TM VARCHAR(12) NOT NULL,
    LEAD_TM VARCHAR(5),
    FCST_PROD_CD VARCHAR(2),
    FCST_QGEN DECIMAL(13,6),
    FCST_CAPA DECIMAL(13,6),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (AREA_GRP_CD, AREA_GRP_ID, CRTN_TM, FCST_TM)
)
"#;

const CREATE_HG_MEAS: &str = r#"
CREATE TABLE IF NOT EXISTS REP_DATA_HG_MEAS_GEM_GENT_DA (
    TM VARCHAR(12) NOT NULL,
    AREA_GRP_CD VARCHAR(20) NOT NULL,
    AREA_GRP_ID VARCHAR(20) NOT NULL,
    HGEN_PROD DECIMAL(18,5),
    HGEN_CAPA DECIMAL(18,5),
    REG_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UPD_DATE TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (TM, AREA_GRP_CD, AREA_GRP_ID)
)
"#;

pub fn create_table_sql(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Lfd => CREATE_LFD,
        TableKind::Gen => CREATE_GEN,
        TableKind::Nwp => CREATE_NWP,
        TableKind::Kpx => CREATE_KPX,
        TableKind::Curt => CREATE_CURT,
        TableKind::HgGen => CREATE_HG_GEN,
        TableKind::HgMeas => CREATE_HG_MEAS,
    }
}

/// `CREATE TABLE IF NOT EXISTS` for one table.
pub async fn ensure_table(conn: &mut PgConnection, kind: TableKind) -> Result<(), sqlx::Error> {
    sqlx::query(create_table_sql(kind))
        .execute(conn)
        .await
        .map(|_| ())
}

pub async fn truncate_table(conn: &mut PgConnection, kind: TableKind) -> Result<(), sqlx::Error> {
    // Table names come from a closed enum, never from input.
    let sql = format!("TRUNCATE TABLE {}", kind.table_name());
    sqlx::query(&sql).execute(conn).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_idempotent_ddl_for_its_own_name() {
        for kind in TableKind::ALL {
            let sql = create_table_sql(kind);
            assert!(sql.contains("CREATE TABLE IF NOT EXISTS"));
            assert!(sql.contains(kind.table_name()), "{kind} DDL names another table");
            assert!(sql.contains("PRIMARY KEY"));
        }
    }

    #[test]
    fn curtailment_primary_key_matches_upsert_target() {
        assert!(create_table_sql(TableKind::Curt).contains("PRIMARY KEY (CRTN_TM, FCST_TM)"));
    }
}
