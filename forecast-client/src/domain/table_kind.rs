use std::{fmt, str::FromStr};

/// The seven reporting tables the simulator fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    /// Load (demand) forecast.
    Lfd,
    /// Renewable generation forecast, per fuel type.
    Gen,
    /// Numerical weather prediction.
    Nwp,
    /// Grid supply/demand balance.
    Kpx,
    /// Curtailment forecast.
    Curt,
    /// Hydrogen production forecast, per area group.
    HgGen,
    /// Measured hydrogen production, per area group.
    HgMeas,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown table kind '{0}'")]
pub struct UnknownTableKind(pub String);

impl TableKind {
    /// Load order used by the batch loader and by schema creation.
    pub const ALL: [TableKind; 7] = [
        TableKind::Lfd,
        TableKind::Gen,
        TableKind::Nwp,
        TableKind::Kpx,
        TableKind::Curt,
        TableKind::HgGen,
        TableKind::HgMeas,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            TableKind::Lfd => "LFD",
            TableKind::Gen => "GEN",
            TableKind::Nwp => "NWP",
            TableKind::Kpx => "KPX",
            TableKind::Curt => "CURT",
            TableKind::HgGen => "HG_GEN",
            TableKind::HgMeas => "HG_MEAS",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::Lfd => "REP_DATA_RE_FCST_LFD_DA",
            TableKind::Gen => "REP_DATA_RE_FCST_GEN_DA",
            TableKind::Nwp => "REP_DATA_HG_FCST_NWP_DA",
            TableKind::Kpx => "REP_DATA_RE_KPX_JEJU_SUKUB_M",
            TableKind::Curt => "REP_DATA_P2H_FCST_CURT_DA",
            TableKind::HgGen => "REP_DATA_HG_FCST_GEN_GENT_DA",
            TableKind::HgMeas => "REP_DATA_HG_MEAS_GEM_GENT_DA",
        }
    }

    /// Rows are written with insert-or-replace on the natural key.
    pub fn is_upsert(self) -> bool {
        matches!(self, TableKind::Curt)
    }

    /// Produced on every run regardless of the table filter.
    pub fn is_always_produced(self) -> bool {
        matches!(self, TableKind::Curt | TableKind::Kpx)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TableKind {
    type Err = UnknownTableKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        TableKind::ALL
            .into_iter()
            .find(|k| k.tag() == wanted)
            .ok_or_else(|| UnknownTableKind(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("hg_gen".parse::<TableKind>(), Ok(TableKind::HgGen));
        assert_eq!(" HG_MEAS ".parse::<TableKind>(), Ok(TableKind::HgMeas));
        assert_eq!("Curt".parse::<TableKind>(), Ok(TableKind::Curt));
    }

    #[test]
    fn rejects_near_misses() {
        assert!("HGGEN".parse::<TableKind>().is_err());
        assert!("".parse::<TableKind>().is_err());
    }

    #[test]
    fn only_curtailment_is_upserted() {
        let upserts: Vec<_> = TableKind::ALL.into_iter().filter(|k| k.is_upsert()).collect();
        assert_eq!(upserts, vec![TableKind::Curt]);
    }
}
