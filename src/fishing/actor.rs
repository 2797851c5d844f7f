//! Single-owner fishing task
//!
//! Host callbacks only push [`FisherEvent`]s into a channel. One tokio task
//! owns the [`FishingStateMachine`] and handles events in arrival order, so a
//! velocity update can never observe a half-finished reset from a tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use super::machine::FishingStateMachine;
use crate::error::FisherError;
use crate::host::{EntityId, Host, SpawnedObject, Velocity};
use crate::settings::Settings;
use crate::utils::bot_state::SharedFisherState;

/// Notification delivered to the fishing task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FisherEvent {
    Tick,
    ObjectSpawned(SpawnedObject),
    EntityVelocity { entity: EntityId, velocity: Velocity },
}

/// Sending half handed to the host's event source.
///
/// Never blocks. Events are dropped once the fisher is stopped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<FisherEvent>,
    stop: Arc<AtomicBool>,
}

impl EventSink {
    pub fn tick(&self) {
        self.send(FisherEvent::Tick);
    }

    pub fn object_spawned(&self, object: SpawnedObject) {
        self.send(FisherEvent::ObjectSpawned(object));
    }

    pub fn entity_velocity(&self, entity: EntityId, velocity: Velocity) {
        self.send(FisherEvent::EntityVelocity { entity, velocity });
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn send(&self, event: FisherEvent) {
        if self.is_stopped() {
            return;
        }
        // closed channel means the task is gone; nothing left to notify
        let _ = self.tx.send(event);
    }
}

/// A running fisher
pub struct Fisher {
    tx: mpsc::UnboundedSender<FisherEvent>,
    stop: Arc<AtomicBool>,
    shared: Arc<SharedFisherState>,
    task: JoinHandle<()>,
}

impl Fisher {
    /// Check host preconditions, subscribe to its events and spawn the
    /// fishing task. Must be called from within a tokio runtime.
    pub fn start<H: Host + 'static>(host: Arc<H>, settings: Settings) -> Result<Self, FisherError> {
        let toggles = host.toggles();
        if !toggles.load_entities || !toggles.load_mobs {
            let err = FisherError::entities_not_loaded();
            tracing::warn!("[FISHER] Refusing to start: {}", err);
            return Err(err);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(SharedFisherState::new());
        shared.set_running(true);

        host.subscribe(EventSink {
            tx: tx.clone(),
            stop: stop.clone(),
        });

        let machine = FishingStateMachine::new(&settings);
        tracing::info!("[FISHER] Started with {:?}", settings);
        let task = tokio::spawn(run(host, machine, rx, stop.clone(), shared.clone()));

        Ok(Self { tx, stop, shared, task })
    }

    /// Raise the stop signal. The task unsubscribes and exits on its next event.
    pub fn stop(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("[FISHER] Stop requested");
        // wake the task even if the host has gone quiet
        let _ = self.tx.send(FisherEvent::Tick);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Status shared with observers
    pub fn status(&self) -> Arc<SharedFisherState> {
        self.shared.clone()
    }

    /// Wait for the task to finish after [`Fisher::stop`]
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

async fn run<H: Host + ?Sized>(
    host: Arc<H>,
    mut machine: FishingStateMachine,
    mut rx: mpsc::UnboundedReceiver<FisherEvent>,
    stop: Arc<AtomicBool>,
    shared: Arc<SharedFisherState>,
) {
    while let Some(event) = rx.recv().await {
        if stop.load(Ordering::SeqCst) {
            host.unsubscribe();
            break;
        }

        let now = Instant::now();
        match event {
            FisherEvent::Tick => {
                let status = host.status();
                for action in machine.on_tick(now, &status, host.as_ref()) {
                    tracing::debug!("[FISHER] {:?}", action);
                    host.apply(&action);
                }
            }
            FisherEvent::ObjectSpawned(object) => {
                let agent_id = host.status().entity_id;
                machine.on_object_spawned(agent_id, &object);
            }
            FisherEvent::EntityVelocity { entity, velocity } => {
                machine.on_entity_velocity(now, entity, velocity);
            }
        }

        shared.set_activity(machine.activity());
        shared.set_stats(machine.stats());
    }

    shared.set_running(false);
    let stats = machine.stats();
    tracing::info!(
        "[FISHER] Stopped: casts={}, bites={}, timeouts={}, lure_failures={}",
        stats.casts,
        stats.bites,
        stats.timeouts,
        stats.lure_failures
    );
}
