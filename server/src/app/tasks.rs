//! Background task execution.
//!
//! - [`ChannelTaskQueue`]: [`TaskQueue`] over a bounded `tokio::sync::mpsc` channel
//! - [`TaskRunner`]: executes one [`Task`] (email, featured speaker, announcement)
//! - [`spawn_worker`]: drains the channel into a runner until every sender is gone
//!
//! Enqueueing never waits: a full channel is reported as a queue error and
//! the caller logs it.

use conference_core::announcement::AnnouncementRefresher;
use conference_core::providers::EmailProvider;
use conference_core::store::{BoxFuture, TaskQueue};
use conference_core::tasks::Task;
use conference_core::{ConferenceError, Result};
use conference_runtime::metrics::{ANNOUNCEMENT_REFRESHES, TASKS_PROCESSED};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// In-process task queue.
#[derive(Clone, Debug)]
pub struct ChannelTaskQueue {
    sender: mpsc::Sender<Task>,
}

impl ChannelTaskQueue {
    /// Create a queue holding at most `capacity` pending tasks, plus the
    /// receiving end for [`spawn_worker`].
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl TaskQueue for ChannelTaskQueue {
    fn enqueue(&self, task: Task) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let name = task.name();
            match self.sender.try_send(task) {
                Ok(()) => {
                    tracing::debug!(task = name, "Task enqueued");
                    Ok(())
                },
                Err(TrySendError::Full(_)) => {
                    Err(ConferenceError::Queue(format!("queue is full, dropped {name}")))
                },
                Err(TrySendError::Closed(_)) => {
                    Err(ConferenceError::Queue(format!("worker has stopped, dropped {name}")))
                },
            }
        })
    }
}

/// Executes background tasks.
#[derive(Clone)]
pub struct TaskRunner {
    refresher: AnnouncementRefresher,
    email: Arc<dyn EmailProvider>,
}

impl TaskRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(refresher: AnnouncementRefresher, email: Arc<dyn EmailProvider>) -> Self {
        Self { refresher, email }
    }

    /// Run one task.
    ///
    /// Returns the announcement written to the cache, if the task refreshed
    /// one.
    ///
    /// # Errors
    ///
    /// Propagates store, cache and email failures.
    pub async fn run(&self, task: Task) -> Result<Option<String>> {
        let name = task.name();
        let result = match task {
            Task::SendConfirmationEmail {
                email,
                conference_info,
            } => self
                .email
                .send_conference_confirmation(&email, &conference_info)
                .await
                .map(|()| None),
            Task::SetFeaturedSpeaker { speaker } => {
                let result = self.refresher.refresh_featured_speaker(&speaker).await;
                record_refresh("featured_speaker", &result);
                result
            },
            Task::RefreshAnnouncement => {
                let result = self.refresher.refresh_nearly_sold_out().await;
                record_refresh("nearly_sold_out", &result);
                result
            },
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(TASKS_PROCESSED, "task" => name, "result" => outcome).increment(1);
        result
    }
}

fn record_refresh(kind: &'static str, result: &Result<Option<String>>) {
    let outcome = match result {
        Ok(Some(_)) => "set",
        Ok(None) => "cleared",
        Err(_) => "error",
    };
    metrics::counter!(ANNOUNCEMENT_REFRESHES, "kind" => kind, "result" => outcome).increment(1);
}

/// Consume `receiver` until the channel closes, running each task in turn.
///
/// Task failures are logged; the worker keeps going.
pub fn spawn_worker(mut receiver: mpsc::Receiver<Task>, runner: TaskRunner) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Task worker started");
        while let Some(task) = receiver.recv().await {
            let name = task.name();
            match runner.run(task).await {
                Ok(_) => tracing::debug!(task = name, "Task completed"),
                Err(error) => tracing::error!(task = name, error = %error, "Task failed"),
            }
        }
        tracing::info!("Task worker stopped");
    })
}
