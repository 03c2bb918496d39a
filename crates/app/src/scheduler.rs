//! Action scheduler: bounded queue, worker limit and lifecycle bookkeeping
//! of the action instances of one Thing.
//!
//! Each Thing owns one dispatcher task draining a bounded queue. A job only
//! starts once one of `action_workers` permits is free, so a slow action
//! never blocks property access or actions of other Things. Every status
//! change is written to the [`ActionLog`] and published while its lock is
//! held, so subscribers observe `created → pending → completed | error` in
//! order. Closing the Thing fails every job still queued as cancelled.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value as Json;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use webthing_domain::action::{ActionInstance, ActionStatus};
use webthing_domain::error::{ActionFault, NotFoundError, TransitionError, WebThingError};
use webthing_domain::id::ActionId;
use webthing_domain::message::OutboundMessage;
use webthing_domain::value::Value;

use crate::action_table::ActionBinding;
use crate::config::{Backpressure, RuntimeConfig};
use crate::context::Shared;
use crate::hub::NotificationHub;

/// An admitted action waiting for a worker.
pub(crate) struct Job {
    pub(crate) id: ActionId,
    pub(crate) binding: Arc<ActionBinding>,
    pub(crate) cancellation: CancellationToken,
}

struct LogEntry {
    instance: ActionInstance,
    cancellation: CancellationToken,
}

/// Every action instance of one Thing, in request order, until removed.
pub(crate) struct ActionLog {
    thing_href: String,
    entries: Mutex<Vec<LogEntry>>,
}

impl ActionLog {
    pub(crate) fn new(thing_href: impl Into<String>) -> Self {
        Self {
            thing_href: thing_href.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn descriptor(&self, instance: &ActionInstance) -> Json {
        instance.descriptor(&format!(
            "{}/actions/{}/{}",
            self.thing_href, instance.name, instance.id
        ))
    }

    fn publish(&self, instance: &ActionInstance, hub: &NotificationHub) {
        hub.publish(OutboundMessage::ActionStatus {
            descriptor: self.descriptor(instance),
        });
    }

    /// Record a freshly created instance and announce it.
    pub(crate) fn admit(
        &self,
        instance: ActionInstance,
        cancellation: CancellationToken,
        hub: &NotificationHub,
    ) -> Json {
        let mut entries = self.lock();
        let descriptor = self.descriptor(&instance);
        self.publish(&instance, hub);
        entries.push(LogEntry {
            instance,
            cancellation,
        });
        descriptor
    }

    /// `created → pending`. Returns the validated input, or `None` when the
    /// instance was removed while queued.
    fn start(&self, id: ActionId, hub: &NotificationHub) -> Option<BTreeMap<String, Value>> {
        let mut entries = self.lock();
        let entry = entries.iter_mut().find(|entry| entry.instance.id == id)?;
        if let Err(err) = entry.instance.start() {
            tracing::warn!(%err, action = %id, "could not start action");
            return None;
        }
        self.publish(&entry.instance, hub);
        Some(entry.instance.input.clone())
    }

    /// `pending → completed | error`, depending on `outcome`.
    fn finish(&self, id: ActionId, outcome: Result<(), ActionFault>, hub: &NotificationHub) {
        let mut entries = self.lock();
        let Some(entry) = entries.iter_mut().find(|entry| entry.instance.id == id) else {
            tracing::debug!(action = %id, "action finished after removal");
            return;
        };
        let name = entry.instance.name.clone();
        let transition = match outcome {
            Ok(()) => {
                tracing::info!(action = %id, %name, "action completed");
                entry.instance.complete()
            }
            Err(fault) => {
                tracing::warn!(%fault, action = %id, %name, "action failed");
                entry.instance.fail(fault)
            }
        };
        match transition {
            Ok(()) => self.publish(&entry.instance, hub),
            Err(err) => tracing::warn!(%err, action = %id, "could not finish action"),
        }
    }

    pub(crate) fn describe(&self, name: &str, id: ActionId) -> Result<Json, NotFoundError> {
        let entries = self.lock();
        entries
            .iter()
            .find(|entry| entry.instance.id == id && entry.instance.name == name)
            .map(|entry| self.descriptor(&entry.instance))
            .ok_or_else(|| NotFoundError::new("Action request", id.to_string()))
    }

    /// Descriptors of every instance, or of those of action `name`.
    pub(crate) fn list(&self, name: Option<&str>) -> Vec<Json> {
        let entries = self.lock();
        entries
            .iter()
            .filter(|entry| name.is_none_or(|name| entry.instance.name == name))
            .map(|entry| self.descriptor(&entry.instance))
            .collect()
    }

    pub(crate) fn get(&self, id: ActionId) -> Option<ActionInstance> {
        let entries = self.lock();
        entries
            .iter()
            .find(|entry| entry.instance.id == id)
            .map(|entry| entry.instance.clone())
    }

    /// Signal cancellation to a created or pending instance.
    pub(crate) fn cancel(&self, name: &str, id: ActionId) -> Result<(), WebThingError> {
        let entries = self.lock();
        let entry = entries
            .iter()
            .find(|entry| entry.instance.id == id && entry.instance.name == name)
            .ok_or_else(|| NotFoundError::new("Action request", id.to_string()))?;
        if entry.instance.status.is_terminal() {
            return Err(TransitionError {
                from: entry.instance.status,
                to: ActionStatus::Error,
            }
            .into());
        }
        entry.cancellation.cancel();
        Ok(())
    }

    /// Cancel the instance if still running and forget it.
    pub(crate) fn remove(&self, name: &str, id: ActionId) -> Result<ActionInstance, NotFoundError> {
        let mut entries = self.lock();
        let index = entries
            .iter()
            .position(|entry| entry.instance.id == id && entry.instance.name == name)
            .ok_or_else(|| NotFoundError::new("Action request", id.to_string()))?;
        let entry = entries.remove(index);
        entry.cancellation.cancel();
        Ok(entry.instance)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Submission side of one Thing's action queue.
pub(crate) struct Scheduler {
    sender: mpsc::Sender<Job>,
    backpressure: Backpressure,
    root: CancellationToken,
}

impl Scheduler {
    /// Spawn the dispatcher. Must be called from within a Tokio runtime.
    pub(crate) fn start(shared: Arc<Shared>, config: &RuntimeConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.action_queue_capacity.max(1));
        let root = CancellationToken::new();
        let workers = Arc::new(Semaphore::new(config.action_workers.max(1)));
        tokio::spawn(dispatch(shared, receiver, workers, root.clone()));
        Self {
            sender,
            backpressure: config.backpressure,
            root,
        }
    }

    /// Reserve a queue slot, applying the configured backpressure policy.
    pub(crate) async fn reserve(&self) -> Result<mpsc::Permit<'_, Job>, WebThingError> {
        match self.backpressure {
            Backpressure::Reject => self.sender.try_reserve().map_err(|err| {
                tracing::warn!(%err, "action queue saturated, rejecting request");
                WebThingError::Overloaded
            }),
            Backpressure::Wait { wait_timeout_ms } => {
                let wait = Duration::from_millis(wait_timeout_ms);
                match tokio::time::timeout(wait, self.sender.reserve()).await {
                    Ok(Ok(permit)) => Ok(permit),
                    Ok(Err(err)) => {
                        tracing::warn!(%err, "action queue closed");
                        Err(WebThingError::Overloaded)
                    }
                    Err(_) => {
                        tracing::warn!(?wait, "action queue still saturated, rejecting request");
                        Err(WebThingError::Overloaded)
                    }
                }
            }
        }
    }

    /// Token of a new action; cancelled with the Thing.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Stop dispatching and cancel every running action.
    pub(crate) fn shutdown(&self) {
        self.root.cancel();
    }
}

async fn dispatch(
    shared: Arc<Shared>,
    mut receiver: mpsc::Receiver<Job>,
    workers: Arc<Semaphore>,
    root: CancellationToken,
) {
    while let Some(Some(job)) = root.run_until_cancelled(receiver.recv()).await {
        let Some(Ok(permit)) = root
            .run_until_cancelled(Arc::clone(&workers).acquire_owned())
            .await
        else {
            abandon(&shared, &job);
            break;
        };
        tokio::spawn(execute(Arc::clone(&shared), job, permit));
    }

    // Queued jobs never reach a worker once the Thing is closed.
    receiver.close();
    let mut abandoned = 0_usize;
    while let Ok(job) = receiver.try_recv() {
        abandon(&shared, &job);
        abandoned += 1;
    }
    tracing::debug!(thing = %shared.name, abandoned, "action dispatcher stopped");
}

/// Move a job that will never run through `pending` into a cancelled `error`.
fn abandon(shared: &Shared, job: &Job) {
    if shared.log.start(job.id, &shared.hub).is_some() {
        shared
            .log
            .finish(job.id, Err(ActionFault::Cancelled), &shared.hub);
    }
}

async fn execute(shared: Arc<Shared>, job: Job, _permit: OwnedSemaphorePermit) {
    let Some(input) = shared.log.start(job.id, &shared.hub) else {
        return;
    };

    let outcome = if job.cancellation.is_cancelled() {
        Err(ActionFault::Cancelled)
    } else {
        // Run the body as its own task so a panic fails only this action.
        let body = job.binding.run(job.id, &input, job.cancellation.clone());
        match tokio::spawn(body).await {
            Ok(outcome) => outcome,
            Err(err) => Err(ActionFault::failed(format!("action body aborted: {err}"))),
        }
    };

    shared.log.finish(job.id, outcome, &shared.hub);
}
