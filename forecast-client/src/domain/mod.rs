pub mod records;
pub mod stamp;
pub mod table_kind;

pub use records::{
    round_to, AreaGroup, CurtailmentForecast, DailyRecords, FuelType, GridBalance,
    HydrogenGenForecast, HydrogenMeasurement, LoadForecast, Record, RenewableGeneration,
    VariantSpread, WeatherForecast, VARIANT_COUNT,
};
pub use stamp::{LeadTime, Stamp};
pub use table_kind::{TableKind, UnknownTableKind};
