use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::AppConfig;
use crate::handler::{CheckReport, Handler};
use crate::utils::error::AppError;

fn scheduler_error(e: JobSchedulerError) -> AppError {
    AppError::Scheduler(format!("{:?}", e))
}

/// In-process trigger for running the check on a cron schedule.
///
/// Ticks never overlap: a tick that fires while the previous check is still
/// running is skipped. The watcher stops after the first notification goes
/// out, since nothing is remembered between runs.
pub struct WatchScheduler {
    scheduler: JobScheduler,
    handler: Arc<Handler>,
    config: Arc<AppConfig>,
    running: Arc<Mutex<()>>,
}

impl WatchScheduler {
    pub async fn new(handler: Arc<Handler>, config: Arc<AppConfig>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

        Ok(Self {
            scheduler,
            handler,
            config,
            running: Arc::new(Mutex::new(())),
        })
    }

    /// Runs until a notification has been sent (returning its report) or
    /// the process receives Ctrl-C (returning `None`).
    pub async fn watch(mut self, schedule: &str) -> Result<Option<CheckReport>, AppError> {
        if !AppConfig::is_valid_cron(schedule) {
            return Err(AppError::config(format!("Invalid cron expression: {}", schedule)));
        }

        let (tx, mut rx) = mpsc::channel::<CheckReport>(1);

        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(schedule, move |_uuid, _l| {
            let handler = Arc::clone(&handler);
            let config = Arc::clone(&config);
            let running = Arc::clone(&running);
            let tx = tx.clone();

            Box::pin(async move {
                run_scheduled_check(handler, config, running, tx).await;
            })
        })
        .map_err(scheduler_error)?;

        self.scheduler.add(job).await.map_err(scheduler_error)?;
        self.scheduler.start().await.map_err(scheduler_error)?;
        tracing::info!("Watching with schedule: {}", schedule);

        let outcome = tokio::select! {
            report = rx.recv() => report,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                None
            }
        };

        self.scheduler.shutdown().await.map_err(scheduler_error)?;
        tracing::info!("Watch scheduler shutdown");
        Ok(outcome)
    }
}

/// One scheduled tick. Sends the report on `done` once a notification has
/// gone out.
pub async fn run_scheduled_check(
    handler: Arc<Handler>,
    config: Arc<AppConfig>,
    running: Arc<Mutex<()>>,
    done: mpsc::Sender<CheckReport>,
) {
    let Ok(_guard) = running.try_lock() else {
        tracing::warn!("Previous check still running, skipping this tick");
        return;
    };

    let event = json!({ "source": "watch", "time": Utc::now().to_rfc3339() });
    tracing::debug!("Scheduled check fired: {}", event);

    match handler.run(&config).await {
        Ok(report) if report.notification_sent => {
            if done.send(report).await.is_err() {
                tracing::debug!("Watch already stopped; dropping report");
            }
        }
        Ok(_) => {}
        Err(e) if e.is_transient() => {
            tracing::warn!("Check failed, will retry on the next tick: {}", e);
        }
        Err(e) => {
            tracing::error!("Check failed: {}", e);
        }
    }
}
