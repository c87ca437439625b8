use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::database::store::{ApplicantStore, DynStore, NotificationStore};
use crate::error::Result;
use crate::models::applicant::{ApplicantStatus, ApplicantWithUser};
use crate::models::notification::Notification;
use crate::services::notification_service::NOTIFICATION_LIST_LIMIT;

/// Re-runs a list query on a fixed interval and publishes each result as the
/// latest snapshot. Snapshots replace one another; nothing is diffed. The
/// background task stops when the poller is dropped.
pub struct Poller<T> {
    rx: watch::Receiver<Option<T>>,
    handle: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(snapshot) => {
                        if tx.send(Some(snapshot)).is_err() {
                            break;
                        }
                    }
                    // Keep the previous snapshot and try again next tick.
                    Err(e) => tracing::warn!(error = %e, "poll refresh failed"),
                }
            }
        });
        Self { rx, handle }
    }

    /// Most recent snapshot, or `None` before the first fetch completes.
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Waits until a snapshot satisfies `predicate` and returns it.
    pub async fn wait_for<P>(&mut self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let snapshot = self
            .rx
            .wait_for(|s| s.as_ref().map_or(false, &mut predicate))
            .await
            .ok()?;
        snapshot.clone()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Admin feed of applicants, optionally narrowed to one status.
pub fn applicants(
    store: DynStore,
    status: Option<ApplicantStatus>,
    interval: Duration,
) -> Poller<Vec<ApplicantWithUser>> {
    Poller::spawn(interval, move || {
        let store = store.clone();
        async move { store.list_applicants(status).await }
    })
}

/// Most recent notifications of one applicant.
pub fn notifications(
    store: DynStore,
    applicant_id: i32,
    interval: Duration,
) -> Poller<Vec<Notification>> {
    Poller::spawn(interval, move || {
        let store = store.clone();
        async move {
            store
                .list_notifications(applicant_id, NOTIFICATION_LIST_LIMIT)
                .await
        }
    })
}
