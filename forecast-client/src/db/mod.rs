pub mod forecast_queries;
pub mod report_queries;
pub mod schema;
