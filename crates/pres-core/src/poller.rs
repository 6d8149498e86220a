//! Update polling
//!
//! Read-write sessions ask the engine for accumulated update information on
//! a fixed interval and republish it as [`UpdateEvent`]s.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pres_engine::{NativeEngine, UpdateEvent, parse_update_info};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{Error, Result};

/// Background task polling the engine for updates
pub struct UpdatePoller {
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UpdatePoller {
    /// Spawn the polling loop on the current tokio runtime.
    ///
    /// Polls run one at a time; ticks missed while a poll is in flight are
    /// skipped. `interval` must be non-zero.
    pub fn start(
        engine: Arc<dyn NativeEngine>,
        interval: Duration,
        events: broadcast::Sender<UpdateEvent>,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        match poll_once(engine.as_ref(), &events).await {
                            Ok(0) => {}
                            Ok(count) => tracing::debug!(events = count, "Published update events"),
                            Err(e) => tracing::warn!(error = %e, "Update poll failed"),
                        }
                    }
                }
            }
            tracing::debug!("Update poller stopped");
        });

        tracing::info!(interval_ms = interval.as_millis() as u64, "Started update poller");
        Self {
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Check whether the loop is still running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop the loop. No poll starts after this returns.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }
}

impl Drop for UpdatePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one poll cycle. Returns the number of events published.
pub async fn poll_once(
    engine: &dyn NativeEngine,
    events: &broadcast::Sender<UpdateEvent>,
) -> Result<usize> {
    let Some(info) = engine
        .get_update_info()
        .await
        .map_err(|e| Error::engine("getUpdateInfo", e))?
    else {
        return Ok(0);
    };

    let parsed = parse_update_info(&info).map_err(|source| Error::Decode {
        request: "getUpdateInfo".into(),
        source,
    })?;
    let count = parsed.len();
    for event in parsed {
        // No subscribers is not an error; the event is dropped.
        let _ = events.send(event);
    }
    Ok(count)
}
