use std::{collections::BTreeSet, fmt};

use forecast_client::domain::TableKind;

/// Which optional tables a run produces.
///
/// Curtailment and grid balance are always produced. Of the rest, only the
/// kinds named in an `Only` filter are synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableFilter {
    #[default]
    All,
    Only {
        kinds: BTreeSet<TableKind>,
        /// Names that matched no table; kept for logging.
        ignored: Vec<String>,
    },
}

impl TableFilter {
    /// Parse a comma separated, case-insensitive list such as `"hg_gen,HG_MEAS"`.
    /// Unknown names are ignored rather than rejected.
    pub fn parse_list(list: &str) -> Self {
        let mut kinds = BTreeSet::new();
        let mut ignored = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.parse::<TableKind>() {
                Ok(kind) => {
                    kinds.insert(kind);
                }
                Err(_) => ignored.push(name.to_string()),
            }
        }
        TableFilter::Only { kinds, ignored }
    }

    pub fn synthesizes(&self, kind: TableKind) -> bool {
        match self {
            TableFilter::All => true,
            TableFilter::Only { kinds, .. } => kind.is_always_produced() || kinds.contains(&kind),
        }
    }

    /// The loader always attempts the core tables; the hydrogen tables are
    /// attempted only when admitted.
    pub fn loads(&self, kind: TableKind) -> bool {
        match kind {
            TableKind::HgGen | TableKind::HgMeas => self.synthesizes(kind),
            _ => true,
        }
    }

    pub fn ignored(&self) -> &[String] {
        match self {
            TableFilter::All => &[],
            TableFilter::Only { ignored, .. } => ignored,
        }
    }
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFilter::All => f.write_str("ALL"),
            TableFilter::Only { kinds, .. } => {
                let tags: Vec<&str> = kinds.iter().map(|k| k.tag()).collect();
                write!(f, "[{}]", tags.join(","))
            }
        }
    }
}
