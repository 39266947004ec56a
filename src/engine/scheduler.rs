use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::poller::PollEngine;
use super::schedule::Schedule;
use crate::types::AgentId;

/// Drives the poll engine on a background task at the configured cadence.
///
/// At most one schedule is armed at a time; arming again replaces the
/// previous one. Disarming is non-preemptive: it stops future fires but an
/// in-flight poll cycle runs to completion. A fire that lands while a
/// cycle is still running is skipped (the engine's cycle gate is
/// try-acquired), and fires missed during a long cycle are not replayed.
pub struct Scheduler {
    running: Mutex<Option<ArmedSchedule>>,
}

struct ArmedSchedule {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            running: Mutex::new(None),
        }
    }

    pub fn arm(
        &self,
        schedule: Schedule,
        engine: Arc<PollEngine>,
        agents: Arc<RwLock<BTreeSet<AgentId>>>,
    ) {
        self.disarm();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(schedule, engine, agents, stop_rx));

        let mut running = self.running.lock().unwrap();
        *running = Some(ArmedSchedule { stop_tx, handle });
    }

    /// Stop future fires. The current cycle, if any, completes normally.
    pub fn disarm(&self) {
        let mut running = self.running.lock().unwrap();
        if let Some(armed) = running.take() {
            // The task exits at its next sleep checkpoint; if the receiver
            // is already gone the task has finished on its own.
            let _ = armed.stop_tx.send(true);
            drop(armed.handle);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.running.lock().unwrap().is_some()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run_loop(
    schedule: Schedule,
    engine: Arc<PollEngine>,
    agents: Arc<RwLock<BTreeSet<AgentId>>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        // Computed after the previous cycle finished, so fires missed
        // during a long cycle are skipped rather than replayed.
        let Some(delay) = schedule.next_delay(Utc::now()) else {
            log::warn!("schedule has no future occurrence; scheduler exiting");
            return;
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    return;
                }
            }
        }

        let ids: Vec<AgentId> = agents.read().unwrap().iter().cloned().collect();
        if ids.is_empty() {
            continue;
        }

        match engine.try_poll_cycle(&ids).await {
            Some(changes) => {
                if !changes.is_empty() {
                    log::info!("scheduled poll cycle: {} status changes", changes.len());
                }
            }
            None => log::debug!("previous poll cycle still running; trigger skipped"),
        }

        if *stop_rx.borrow() {
            return;
        }
    }
}
