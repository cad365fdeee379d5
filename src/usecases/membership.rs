use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    domain::page::PageContext,
    realtime::{contracts::FacadeProvider, discovery::poll_until},
};

const MEMBERSHIP_NO_RESOURCE_ID: &str = "MEMBERSHIP_NO_RESOURCE_ID";
const MEMBERSHIP_WORKER_SPAWN_FAILED: &str = "MEMBERSHIP_WORKER_SPAWN_FAILED";
const MEMBERSHIP_JOINED: &str = "MEMBERSHIP_JOINED";
const MEMBERSHIP_JOIN_FAILED: &str = "MEMBERSHIP_JOIN_FAILED";
const MEMBERSHIP_LEAVE_FAILED: &str = "MEMBERSHIP_LEAVE_FAILED";
const MEMBERSHIP_SHUTDOWN_FAILED: &str = "MEMBERSHIP_SHUTDOWN_FAILED";
const MEMBERSHIP_QUESTION_FEED_SKIPPED: &str = "MEMBERSHIP_QUESTION_FEED_SKIPPED";

/// Joins the resource-scoped notification group for the current page and
/// leaves it again when dropped (the page-teardown analog).
///
/// The façade poll has no attempt ceiling; it runs until the façade shows
/// up or the guard is dropped. Leaves are mirrored best-effort against
/// whatever façades are available at drop time, with no retry.
pub struct GroupMembership {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    provider: Arc<dyn FacadeProvider>,
    group: String,
    question_id: Option<i64>,
}

impl GroupMembership {
    /// Activates only for pages carrying a resource marker. Without a
    /// resolvable resource id nothing is ever joined.
    pub fn activate(
        page: &PageContext,
        provider: Arc<dyn FacadeProvider>,
        poll_interval: Duration,
    ) -> Option<Self> {
        let marker = page.marker()?;

        let Some(resource_id) = page.resource_id() else {
            tracing::warn!(
                code = MEMBERSHIP_NO_RESOURCE_ID,
                kind = marker.kind(),
                "resource marker present but no id resolvable, skipping group join"
            );
            return None;
        };

        let group = format!("{}-{}", marker.kind(), resource_id);
        let question_id = resource_id.parse::<i64>().ok();

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker_provider = provider.clone();
        let worker_group = group.clone();
        let worker = thread::Builder::new()
            .name("roster-group-membership".to_owned())
            .spawn(move || {
                run_membership(worker_provider, worker_group, question_id, poll_interval, stop_rx)
            });

        let worker = match worker {
            Ok(worker) => worker,
            Err(error) => {
                tracing::warn!(
                    code = MEMBERSHIP_WORKER_SPAWN_FAILED,
                    error = %error,
                    "group membership worker could not start"
                );
                return None;
            }
        };

        Some(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            provider,
            group,
            question_id,
        })
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl Drop for GroupMembership {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take() {
            if let Err(error) = worker.join() {
                tracing::warn!(
                    code = MEMBERSHIP_SHUTDOWN_FAILED,
                    error = ?error,
                    "group membership worker panicked on shutdown"
                );
            }
        }

        if let Some(notifications) = self.provider.notifications() {
            if let Err(error) = notifications.leave_group(&self.group) {
                tracing::warn!(
                    code = MEMBERSHIP_LEAVE_FAILED,
                    group = %self.group,
                    error = %error,
                    "leaving notification group failed"
                );
            }
        }

        if let (Some(feed), Some(question_id)) = (self.provider.question_feed(), self.question_id)
        {
            if let Err(error) = feed.leave_question(question_id) {
                tracing::warn!(
                    code = MEMBERSHIP_LEAVE_FAILED,
                    question_id,
                    error = %error,
                    "leaving question feed failed"
                );
            }
        }
    }
}

fn run_membership(
    provider: Arc<dyn FacadeProvider>,
    group: String,
    question_id: Option<i64>,
    poll_interval: Duration,
    stop_rx: Receiver<()>,
) {
    let Some(notifications) = poll_until(|| provider.notifications(), poll_interval, None, &stop_rx)
    else {
        return;
    };

    match notifications.join_group(&group) {
        Ok(()) => {
            tracing::info!(code = MEMBERSHIP_JOINED, group = %group, "notification group joined");
        }
        Err(error) => {
            tracing::warn!(
                code = MEMBERSHIP_JOIN_FAILED,
                group = %group,
                error = %error,
                "joining notification group failed"
            );
        }
    }

    let Some(feed) = provider.question_feed() else {
        return;
    };

    let Some(question_id) = question_id else {
        tracing::debug!(
            code = MEMBERSHIP_QUESTION_FEED_SKIPPED,
            group = %group,
            "resource id is not an integer, skipping question feed join"
        );
        return;
    };

    match feed.join_question(question_id) {
        Ok(()) => {
            tracing::info!(code = MEMBERSHIP_JOINED, question_id, "question feed joined");
        }
        Err(error) => {
            tracing::warn!(
                code = MEMBERSHIP_JOIN_FAILED,
                question_id,
                error = %error,
                "joining question feed failed"
            );
        }
    }
}
