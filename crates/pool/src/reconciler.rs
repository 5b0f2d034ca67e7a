use std::{sync::Arc, time::Duration};

use log::{error, info};
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{Pool, PoolError};

pub const DEFAULT_RESTORE_INTERVAL: Duration = Duration::from_secs(60);

/// Owns the background restore task. Dropping the handle stops the task.
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    /// Signals the task and waits for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!("Reconciler task failed: {}", err);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

impl Pool {
    /// Starts restoring expired bans every `interval` on the current Tokio
    /// runtime.
    ///
    /// The task holds only a weak reference to the pool, so it also exits
    /// once every `Pool` handle is gone.
    pub fn spawn_reconciler(&self, interval: Duration) -> Result<ReconcilerHandle, PoolError> {
        let handle = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        let shared = Arc::downgrade(&self.shared);
        let interval = interval.max(Duration::from_millis(1));
        let (shutdown, mut stop) = watch::channel(false);

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            info!("Reconciler started, interval {:?}", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop.changed() => break,
                }

                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let restored = Pool { shared }.reconcile();
                if !restored.is_empty() {
                    info!("Reconciler restored {} endpoint(s)", restored.len());
                }
            }

            info!("Reconciler stopped");
        });

        Ok(ReconcilerHandle {
            shutdown,
            task: Some(task),
        })
    }
}
