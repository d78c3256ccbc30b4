pub mod cli;
pub mod config;
pub mod filter;
pub mod maintenance;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod profile;
pub mod scheduler;
pub mod simulation;
pub mod sinks;
pub mod sources;
pub mod synth;
pub mod transform;

pub use pipeline::{Envelope, Pipeline};
