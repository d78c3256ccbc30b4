use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use super::{LeadTime, Stamp, TableKind};

pub const VARIANT_COUNT: usize = 6;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum FuelType {
    Solar,
    Wind,
    Hydro,
    Biomass,
    Geothermal,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Solar,
        FuelType::Wind,
        FuelType::Hydro,
        FuelType::Biomass,
        FuelType::Geothermal,
    ];

    pub fn code(self) -> &'static str {
        match self {
            FuelType::Solar => "SOLAR",
            FuelType::Wind => "WIND",
            FuelType::Hydro => "HYDRO",
            FuelType::Biomass => "BIOMASS",
            FuelType::Geothermal => "GEOTHERMAL",
        }
    }
}

/// Hydrogen production site clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AreaGroup {
    Seoul,
    Busan,
    Daegu,
    Inchon,
    Gwangju,
    Daejeon,
    Ulsan,
    Sejong,
}

impl AreaGroup {
    pub const ALL: [AreaGroup; 8] = [
        AreaGroup::Seoul,
        AreaGroup::Busan,
        AreaGroup::Daegu,
        AreaGroup::Inchon,
        AreaGroup::Gwangju,
        AreaGroup::Daejeon,
        AreaGroup::Ulsan,
        AreaGroup::Sejong,
    ];

    pub fn code(self) -> &'static str {
        match self {
            AreaGroup::Seoul => "SEOUL",
            AreaGroup::Busan => "BUSAN",
            AreaGroup::Daegu => "DAEGU",
            AreaGroup::Inchon => "INCHON",
            AreaGroup::Gwangju => "GWANGJU",
            AreaGroup::Daejeon => "DAEJEON",
            AreaGroup::Ulsan => "ULSAN",
            AreaGroup::Sejong => "SEJONG",
        }
    }
}

/// Six model variants of one forecast and their aggregates
/// (`FCST_QG01..QG06`, `FCST_QGEN`, `FCST_QGMX`, `FCST_QGMN`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VariantSpread {
    pub variants: [f64; VARIANT_COUNT],
    /// Mean of the variants.
    pub headline: f64,
    pub max: f64,
    pub min: f64,
}

impl VariantSpread {
    /// Aggregates already-rounded variants; all aggregates are rounded to 6 decimals.
    pub fn from_variants(variants: [f64; VARIANT_COUNT]) -> Self {
        let sum: f64 = variants.iter().sum();
        let max = variants.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = variants.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            variants,
            headline: round_to(sum / VARIANT_COUNT as f64, 6),
            max: round_to(max, 6),
            min: round_to(min, 6),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LoadForecast {
    pub creation: Stamp,
    pub forecast: Stamp,
    pub lead_time: LeadTime,
    pub product_code: String,
    pub spread: VariantSpread,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RenewableGeneration {
    pub power_class: String,
    pub fuel: FuelType,
    pub creation: Stamp,
    pub forecast: Stamp,
    pub lead_time: LeadTime,
    pub product_code: String,
    pub spread: VariantSpread,
    pub capacity: f64,
    pub storage_charge: f64,
    pub storage_discharge: f64,
    pub storage_capacity: f64,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WeatherForecast {
    pub power_class: String,
    pub area_group: String,
    pub area_id: String,
    pub creation: Stamp,
    pub forecast: Stamp,
    pub lead_time: LeadTime,
    pub product_code: String,
    /// W/m²
    pub irradiance: f64,
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// m/s
    pub wind_speed: f64,
    /// hPa
    pub pressure: f64,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GridBalance {
    pub observed: Stamp,
    pub supply_capability: f64,
    pub current_load: f64,
    pub renewable_total: f64,
    pub renewable_solar: f64,
    pub renewable_wind: f64,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CurtailmentForecast {
    pub creation: Stamp,
    pub forecast: Stamp,
    pub lead_time: LeadTime,
    pub min_power: f64,
    pub curtailment: f64,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HydrogenGenForecast {
    pub area_group: AreaGroup,
    pub area_id: String,
    pub creation: Stamp,
    pub forecast: Stamp,
    pub lead_time: LeadTime,
    pub product_code: String,
    /// MWh
    pub production: f64,
    pub capacity: f64,
    pub registered_at: Stamp,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HydrogenMeasurement {
    pub observed: Stamp,
    pub area_group: AreaGroup,
    pub area_id: String,
    /// kg
    pub production: f64,
    pub capacity: f64,
    pub registered_at: Stamp,
}

/// One row for any of the seven tables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "table", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum Record {
    Lfd(LoadForecast),
    Gen(RenewableGeneration),
    Nwp(WeatherForecast),
    Kpx(GridBalance),
    Curt(CurtailmentForecast),
    HgGen(HydrogenGenForecast),
    HgMeas(HydrogenMeasurement),
}

impl Record {
    pub fn kind(&self) -> TableKind {
        match self {
            Record::Lfd(_) => TableKind::Lfd,
            Record::Gen(_) => TableKind::Gen,
            Record::Nwp(_) => TableKind::Nwp,
            Record::Kpx(_) => TableKind::Kpx,
            Record::Curt(_) => TableKind::Curt,
            Record::HgGen(_) => TableKind::HgGen,
            Record::HgMeas(_) => TableKind::HgMeas,
        }
    }

    /// `(creation, forecast)` for forecast-bearing rows.
    pub fn forecast_window(&self) -> Option<(Stamp, Stamp)> {
        match self {
            Record::Lfd(r) => Some((r.creation, r.forecast)),
            Record::Gen(r) => Some((r.creation, r.forecast)),
            Record::Nwp(r) => Some((r.creation, r.forecast)),
            Record::Curt(r) => Some((r.creation, r.forecast)),
            Record::HgGen(r) => Some((r.creation, r.forecast)),
            Record::Kpx(_) | Record::HgMeas(_) => None,
        }
    }

    pub fn spread(&self) -> Option<&VariantSpread> {
        match self {
            Record::Lfd(r) => Some(&r.spread),
            Record::Gen(r) => Some(&r.spread),
            _ => None,
        }
    }

    /// The table's primary key rendered as text. `None` for the load
    /// forecast table, which is keyed by a serial id.
    pub fn natural_key(&self) -> Option<String> {
        match self {
            Record::Lfd(_) => None,
            Record::Gen(r) => Some(format!(
                "{}|{}|{}|{}",
                r.power_class,
                r.fuel.code(),
                r.creation,
                r.forecast
            )),
            Record::Nwp(r) => Some(format!(
                "{}|{}|{}|{}|{}",
                r.power_class, r.area_group, r.area_id, r.creation, r.forecast
            )),
            Record::Kpx(r) => Some(r.observed.key()),
            Record::Curt(r) => Some(format!("{}|{}", r.creation, r.forecast)),
            Record::HgGen(r) => Some(format!(
                "{}|{}|{}|{}",
                r.area_group.code(),
                r.area_id,
                r.creation,
                r.forecast
            )),
            Record::HgMeas(r) => Some(format!(
                "{}|{}|{}",
                r.observed,
                r.area_group.code(),
                r.area_id
            )),
        }
    }
}

/// Everything synthesized for one calendar day, one list per table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyRecords {
    pub lfd: Vec<LoadForecast>,
    pub gen: Vec<RenewableGeneration>,
    pub nwp: Vec<WeatherForecast>,
    pub kpx: Vec<GridBalance>,
    pub curt: Vec<CurtailmentForecast>,
    pub hg_gen: Vec<HydrogenGenForecast>,
    pub hg_meas: Vec<HydrogenMeasurement>,
}

impl DailyRecords {
    pub fn len_of(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Lfd => self.lfd.len(),
            TableKind::Gen => self.gen.len(),
            TableKind::Nwp => self.nwp.len(),
            TableKind::Kpx => self.kpx.len(),
            TableKind::Curt => self.curt.len(),
            TableKind::HgGen => self.hg_gen.len(),
            TableKind::HgMeas => self.hg_meas.len(),
        }
    }

    pub fn total(&self) -> usize {
        TableKind::ALL.into_iter().map(|k| self.len_of(k)).sum()
    }

    pub fn counts(&self) -> BTreeMap<TableKind, usize> {
        TableKind::ALL.into_iter().map(|k| (k, self.len_of(k))).collect()
    }

    /// Route a record into its table's list.
    pub fn push(&mut self, record: Record) {
        match record {
            Record::Lfd(r) => self.lfd.push(r),
            Record::Gen(r) => self.gen.push(r),
            Record::Nwp(r) => self.nwp.push(r),
            Record::Kpx(r) => self.kpx.push(r),
            Record::Curt(r) => self.curt.push(r),
            Record::HgGen(r) => self.hg_gen.push(r),
            Record::HgMeas(r) => self.hg_meas.push(r),
        }
    }

    /// Clones out the rows of one table as `Record`s.
    pub fn records_of(&self, kind: TableKind) -> Vec<Record> {
        match kind {
            TableKind::Lfd => self.lfd.iter().cloned().map(Record::Lfd).collect(),
            TableKind::Gen => self.gen.iter().cloned().map(Record::Gen).collect(),
            TableKind::Nwp => self.nwp.iter().cloned().map(Record::Nwp).collect(),
            TableKind::Kpx => self.kpx.iter().cloned().map(Record::Kpx).collect(),
            TableKind::Curt => self.curt.iter().cloned().map(Record::Curt).collect(),
            TableKind::HgGen => self.hg_gen.iter().cloned().map(Record::HgGen).collect(),
            TableKind::HgMeas => self.hg_meas.iter().cloned().map(Record::HgMeas).collect(),
        }
    }

    /// All rows in load order.
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.lfd
            .into_iter()
            .map(Record::Lfd)
            .chain(self.gen.into_iter().map(Record::Gen))
            .chain(self.nwp.into_iter().map(Record::Nwp))
            .chain(self.kpx.into_iter().map(Record::Kpx))
            .chain(self.curt.into_iter().map(Record::Curt))
            .chain(self.hg_gen.into_iter().map(Record::HgGen))
            .chain(self.hg_meas.into_iter().map(Record::HgMeas))
    }
}

impl FromIterator<Record> for DailyRecords {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut out = DailyRecords::default();
        for record in iter {
            out.push(record);
        }
        out
    }
}
