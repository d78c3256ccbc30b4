use std::{future::Future, sync::Arc, time::Duration};

use time::{Date, OffsetDateTime, Time, UtcOffset};
use tokio::sync::watch;

use crate::pipeline::PipelineError;

/// One unit of scheduled work, run for the day whose midnight triggered it.
#[async_trait::async_trait]
pub trait Cycle: Send + Sync + 'static {
    async fn run_cycle(&self, day: Date) -> Result<(), PipelineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Waiting { until: OffsetDateTime },
    Running { day: Date },
}

/// Start of the calendar day after `now`, in `now`'s offset. Always strictly
/// later than `now`.
pub fn next_midnight(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT) + time::Duration::DAY
}

/// Where the scheduler's idea of local time comes from.
#[derive(Debug, Clone, Copy)]
pub enum LocalOffset {
    /// A configured offset, used as is.
    Fixed(UtcOffset),
    /// The host offset, re-read before every wait so a daylight-saving
    /// change moves the next midnight with it. `last_known` is kept when
    /// the host cannot be read.
    Host {
        last_known: UtcOffset,
        read: fn() -> Option<UtcOffset>,
    },
}

impl LocalOffset {
    pub fn host(initial: UtcOffset) -> Self {
        LocalOffset::Host {
            last_known: initial,
            read: || UtcOffset::current_local_offset().ok(),
        }
    }

    pub fn current(&mut self) -> UtcOffset {
        match self {
            LocalOffset::Fixed(offset) => *offset,
            LocalOffset::Host { last_known, read } => match read() {
                Some(offset) => {
                    if offset != *last_known {
                        tracing::info!(from = %last_known, to = %offset, "local UTC offset changed");
                        *last_known = offset;
                    }
                    offset
                }
                None => {
                    tracing::debug!(offset = %last_known, "host offset unreadable, keeping last known");
                    *last_known
                }
            },
        }
    }
}

pub struct Scheduler<C> {
    cycle: Arc<C>,
    offset: LocalOffset,
    failure_backoff: Duration,
    state: watch::Sender<Option<SchedulerState>>,
}

impl<C: Cycle> Scheduler<C> {
    pub fn new(cycle: Arc<C>, offset: LocalOffset, failure_backoff: Duration) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            cycle,
            offset,
            failure_backoff,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SchedulerState>> {
        self.state.subscribe()
    }

    /// Run a cycle at every local midnight until `shutdown` resolves.
    ///
    /// Shutdown is only observed while waiting; a running cycle always
    /// finishes. Cycle errors and panics are logged, followed by the
    /// failure backoff, and the loop carries on.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset = self.offset;
        let mut last_day: Option<Date> = None;

        loop {
            let now = OffsetDateTime::now_utc().to_offset(offset.current());
            let mut wake_at = next_midnight(now);
            // Never run the same day twice, even if the timer fired early.
            while last_day.is_some_and(|last| wake_at.date() <= last) {
                wake_at += time::Duration::DAY;
            }
            let wait = Duration::try_from(wake_at - now).unwrap_or(Duration::ZERO);
            self.state.send_replace(Some(SchedulerState::Waiting { until: wake_at }));
            tracing::info!(until = %wake_at, wait_secs = wait.as_secs(), "waiting for next midnight");

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, scheduler stopping");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let day = wake_at.date();
            last_day = Some(day);
            self.state.send_replace(Some(SchedulerState::Running { day }));
            if !self.run_once(day).await {
                tracing::info!(backoff_secs = self.failure_backoff.as_secs(), "backing off after failed cycle");
                tokio::time::sleep(self.failure_backoff).await;
            }
        }
    }

    /// Runs the cycle on its own task so a panic is contained. Returns
    /// whether it succeeded.
    async fn run_once(&self, day: Date) -> bool {
        metrics::counter!("simulator_cycles_total").increment(1);
        tracing::info!(%day, "cycle started");

        let cycle = Arc::clone(&self.cycle);
        let handle = tokio::spawn(async move { cycle.run_cycle(day).await });

        let failure = match handle.await {
            Ok(Ok(())) => {
                tracing::info!(%day, "cycle finished");
                return true;
            }
            Ok(Err(e)) => e.to_string(),
            Err(join) if join.is_panic() => "cycle panicked".to_string(),
            Err(join) => join.to_string(),
        };

        metrics::counter!("simulator_cycle_failures_total").increment(1);
        tracing::error!(%day, error = %failure, "cycle failed");
        false
    }
}
