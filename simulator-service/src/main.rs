use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use forecast_client::domain::TableKind;
use simulator_service::{
    cli::{self, Command, USAGE},
    config::AppConfig,
    filter::TableFilter,
    maintenance, metrics_server, observability,
    pipeline::PipelineError,
    scheduler::{LocalOffset, Scheduler},
    simulation::DailySimulation,
    sinks::{ForecastStore, MemoryForecastStore, PgForecastStore},
};
use time::{OffsetDateTime, UtcOffset};

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_STORE_UNAVAILABLE: u8 = 3;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    observability::init_tracing();

    let command = match cli::parse_args() {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(command) => command,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let msg = format!("{e:#}");
            tracing::error!(error = %msg, "energy-simulator failed");
            match e.downcast_ref::<PipelineError>() {
                Some(PipelineError::Connection(_)) => ExitCode::from(EXIT_STORE_UNAVAILABLE),
                _ => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}

fn run(command: Command) -> Result<()> {
    let cfg = AppConfig::load()?;
    // The host offset is first read before any runtime thread exists.
    let offset = resolve_offset(&cfg)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(dispatch(command, cfg, offset))
}

fn resolve_offset(cfg: &AppConfig) -> Result<LocalOffset> {
    if let Some(offset) = cfg.scheduler.parsed_offset()? {
        return Ok(LocalOffset::Fixed(offset));
    }
    match UtcOffset::current_local_offset() {
        Ok(offset) => Ok(LocalOffset::host(offset)),
        Err(e) => {
            tracing::warn!(error = %e, "local UTC offset unavailable, starting from UTC midnight");
            Ok(LocalOffset::host(UtcOffset::UTC))
        }
    }
}

async fn dispatch(command: Command, cfg: AppConfig, mut offset: LocalOffset) -> Result<()> {
    match command {
        Command::Schedule => {
            if let Some(metrics_cfg) = &cfg.metrics {
                metrics_server::init(&metrics_cfg.bind_addr)?;
            }

            let store = Arc::new(PgForecastStore::connect_lazy(&cfg.database));
            let simulation = DailySimulation::new(store, TableFilter::All, cfg.generation.seed);
            let scheduler = Scheduler::new(Arc::new(simulation), offset, cfg.scheduler.failure_backoff());

            tracing::info!(host = %cfg.database.host, db = %cfg.database.name, ?offset, "scheduler started");
            scheduler.run_until(wait_for_interrupt()).await;
            Ok(())
        }
        Command::Manual {
            next_day,
            only,
            seed,
            dry_run,
        } => {
            let today = OffsetDateTime::now_utc().to_offset(offset.current()).date();
            let day = if next_day {
                today.next_day().context("no calendar day after today")?
            } else {
                today
            };
            let filter = only.unwrap_or_default();
            let seed = seed.or(cfg.generation.seed);

            if dry_run {
                let memory = Arc::new(MemoryForecastStore::default());
                DailySimulation::new(memory.clone(), filter, seed)
                    .with_echo(true)
                    .run_for(day)
                    .await?;
                for kind in TableKind::ALL {
                    tracing::info!(table = %kind, rows = memory.row_count(kind), "dry-run table contents");
                }
            } else {
                let store: Arc<dyn ForecastStore> = Arc::new(PgForecastStore::connect_lazy(&cfg.database));
                DailySimulation::new(store, filter, seed).run_for(day).await?;
            }
            Ok(())
        }
        Command::Truncate => {
            let store = PgForecastStore::connect_lazy(&cfg.database);
            maintenance::ensure_schema(&store).await?;
            let report = maintenance::clear_all(&store).await?;
            let failed = report.failures().count();
            if failed > 0 {
                tracing::warn!(failed, "some tables could not be cleared");
            }
            Ok(())
        }
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

async fn wait_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
