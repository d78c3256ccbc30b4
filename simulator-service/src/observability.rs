use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const CRATE_DIRECTIVES: [&str; 2] = ["simulator_service=info", "energy_simulator=info"];

/// Logs go to stderr so `--dry-run` output on stdout stays one JSON record per line.
pub fn init_tracing() {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    for directive in CRATE_DIRECTIVES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
