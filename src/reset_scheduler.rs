// src/reset_scheduler.rs - Periodic routine reset
use std::sync::{Arc, Mutex as StdMutex, Weak};

use chrono::NaiveDateTime;
use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use crate::{AppContext, ResetOutcome, Result, TodoError};

#[derive(Debug, Clone, Default)]
pub struct ResetSchedulerStatus {
    /// Whether the scheduler is running
    pub is_running: bool,
    /// When the reset check last ran
    pub last_check_time: Option<NaiveDateTime>,
    /// What the last check did
    pub last_outcome: Option<ResetOutcome>,
}

#[derive(Debug)]
pub enum ResetCommand {
    /// Run the daily reset check immediately and report the outcome
    CheckNow(oneshot::Sender<Result<ResetOutcome>>),
    /// Stop the scheduler
    Stop,
}

pub struct ResetScheduler {
    /// Time between checks
    interval: Duration,

    /// Channel to send commands to the scheduler task
    command_tx: mpsc::Sender<ResetCommand>,

    /// Handle to the scheduler task
    scheduler_task: Option<JoinHandle<()>>,

    /// Shared with the scheduler task, which records every check
    status: Arc<StdMutex<ResetSchedulerStatus>>,

    /// Weak reference to the application context
    context: Option<Weak<Mutex<AppContext>>>,
}

impl ResetScheduler {
    /// Create a new scheduler that checks every `interval`
    pub fn new(interval: Duration) -> Self {
        info!("Initializing reset scheduler with interval {:?}", interval);
        let (command_tx, _) = mpsc::channel(10);

        Self {
            interval,
            command_tx,
            scheduler_task: None,
            status: Arc::new(StdMutex::new(ResetSchedulerStatus::default())),
            context: None,
        }
    }

    /// Set the weak reference to the application context
    pub fn set_context(&mut self, context: Arc<Mutex<AppContext>>) {
        self.context = Some(Arc::downgrade(&context));
        debug!("Context reference set in ResetScheduler.");
    }

    /// Start the scheduler. The first periodic check happens one interval
    /// after this call; the startup check is the caller's job.
    pub async fn start(&mut self) -> Result<()> {
        if self.scheduler_task.is_some() {
            debug!("Reset scheduler already running");
            return Ok(());
        }
        info!("Starting reset scheduler...");

        let context = match &self.context {
            Some(weak) => match weak.upgrade() {
                Some(strong) => strong,
                None => {
                    error!("Failed to retrieve AppContext - reference is no longer valid.");
                    return Err(TodoError::SchedulerError {
                        message: "AppContext reference is no longer valid.".to_string(),
                    });
                }
            },
            None => {
                error!("No context reference found in ResetScheduler.");
                return Err(TodoError::SchedulerError {
                    message: "ResetScheduler does not have a context reference.".to_string(),
                });
            }
        };

        let (command_tx, mut command_rx) = mpsc::channel(10);
        self.command_tx = command_tx;

        let period = self.interval;
        let status = Arc::clone(&self.status);

        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.tick().await; // Initial tick

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match check(&context, &status).await {
                            Ok(outcome) if outcome.did_reset() => info!("Scheduled reset: {:?}", outcome),
                            Ok(outcome) => debug!("Scheduled check: {:?}", outcome),
                            Err(e) => error!("Scheduled reset failed: {}", e),
                        }
                    }
                    Some(cmd) = command_rx.recv() => match cmd {
                        ResetCommand::CheckNow(reply) => {
                            let result = check(&context, &status).await;
                            if let Err(e) = &result {
                                error!("Manual reset check failed: {}", e);
                            }
                            let _ = reply.send(result);
                        }
                        ResetCommand::Stop => {
                            info!("Reset scheduler stopping...");
                            break;
                        }
                    }
                }
            }
        });

        self.scheduler_task = Some(task);
        self.update_status(|s| s.is_running = true)?;

        Ok(())
    }

    /// Stop the scheduler if it's running
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.scheduler_task.take() {
            if let Err(e) = self.command_tx.send(ResetCommand::Stop).await {
                error!("Failed to send stop command to reset scheduler: {}", e);
            }

            if let Err(e) = task.await {
                let error_msg = format!("Failed to stop reset scheduler: {}", e);
                error!("{}", error_msg);
                return Err(TodoError::SchedulerError { message: error_msg });
            }

            self.update_status(|s| s.is_running = false)?;
            info!("Reset scheduler stopped");
        } else {
            debug!("Reset scheduler is not running");
        }

        Ok(())
    }

    /// Run the reset check now, outside the schedule
    pub async fn check_now(&self) -> Result<ResetOutcome> {
        if self.scheduler_task.is_none() {
            return Err(TodoError::SchedulerError {
                message: "Reset scheduler is not running".to_string(),
            });
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(ResetCommand::CheckNow(reply_tx))
            .await
            .map_err(|e| TodoError::SchedulerError {
                message: format!("Failed to send reset command: {}", e),
            })?;

        reply_rx.await.map_err(|e| TodoError::SchedulerError {
            message: format!("Reset scheduler dropped the request: {}", e),
        })?
    }

    /// Get the current status of the scheduler
    pub fn get_status(&self) -> Result<ResetSchedulerStatus> {
        self.status
            .lock()
            .map(|s| s.clone())
            .map_err(|_| TodoError::LockAcquisitionFailed {
                message: "Failed to acquire lock on reset scheduler status".to_string(),
            })
    }

    fn update_status(&self, f: impl FnOnce(&mut ResetSchedulerStatus)) -> Result<()> {
        let mut status = self
            .status
            .lock()
            .map_err(|_| TodoError::LockAcquisitionFailed {
                message: "Failed to acquire lock on reset scheduler status".to_string(),
            })?;
        f(&mut status);
        Ok(())
    }
}

/// One reset check. The context lock is held for the whole check, so a
/// command handler never sees routines and marker half-updated.
async fn check(
    context: &Arc<Mutex<AppContext>>,
    status: &Arc<StdMutex<ResetSchedulerStatus>>,
) -> Result<ResetOutcome> {
    let (checked_at, outcome) = {
        let mut ctx = context.lock().await;
        let checked_at = ctx.now();
        (checked_at, ctx.run_daily_reset()?)
    };

    if let Ok(mut s) = status.lock() {
        s.last_check_time = Some(checked_at);
        s.last_outcome = Some(outcome.clone());
    }

    Ok(outcome)
}
