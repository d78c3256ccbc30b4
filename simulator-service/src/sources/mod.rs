pub mod synthetic_day;

pub use synthetic_day::SyntheticDaySource;
