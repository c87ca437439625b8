use std::sync::Arc;
use std::time::Duration;

use crate::database::store::{ApplicantStore, DynStore, NotificationStore};
use crate::error::{Error, Result};
use crate::models::notification::{NewNotification, Notification, DEFAULT_SENDER};
use crate::services::mail_service::{MailTemplate, Mailer};
use crate::services::poll_service;

/// Notification lists never return more than this many rows.
pub const NOTIFICATION_LIST_LIMIT: i64 = 10;
/// Refresh period of the server-side poller behind the long-poll endpoint.
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const APPLICANT_NOT_FOUND: &str = "Pelamar tidak ditemukan";

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub notification: Notification,
    pub email_sent: bool,
}

#[derive(Clone)]
pub struct NotificationService {
    store: DynStore,
    mailer: Arc<dyn Mailer>,
    template: MailTemplate,
}

impl NotificationService {
    pub fn new(store: DynStore, mailer: Arc<dyn Mailer>, template: MailTemplate) -> Self {
        Self {
            store,
            mailer,
            template,
        }
    }

    /// Records an admin-authored notification and emails it to the applicant.
    /// The record is kept even when delivery fails.
    pub async fn dispatch(&self, new: NewNotification) -> Result<Dispatched> {
        let applicant = self
            .store
            .find_applicant(new.applicant_id)
            .await
            .map_err(|e| e.or_fail("Gagal membuat notifikasi"))?
            .ok_or_else(|| Error::NotFound(APPLICANT_NOT_FOUND.to_string()))?;

        let notification = self
            .store
            .insert_notification(new)
            .await
            .map_err(|e| e.or_fail("Gagal membuat notifikasi"))?;
        tracing::info!(
            applicant_id = applicant.id,
            notification_id = notification.id,
            "notification recorded"
        );

        let sender = notification.sender.as_deref().unwrap_or(DEFAULT_SENDER);
        let email_sent = self
            .email(&applicant.email, sender, &notification.message)
            .await;

        Ok(Dispatched {
            notification,
            email_sent,
        })
    }

    pub async fn list(&self, applicant_id: i32) -> Result<Vec<Notification>> {
        self.store
            .list_notifications(applicant_id, NOTIFICATION_LIST_LIMIT)
            .await
    }

    /// Holds until a notification newer than `after` exists or `timeout`
    /// elapses, then returns the current list.
    pub async fn wait(
        &self,
        applicant_id: i32,
        after: Option<i32>,
        timeout: Duration,
    ) -> Result<Vec<Notification>> {
        let after = after.unwrap_or(0);
        let mut poller =
            poll_service::notifications(self.store.clone(), applicant_id, WAIT_POLL_INTERVAL);
        let newer = poller.wait_for(|list| list.first().map_or(false, |n| n.id > after));

        match tokio::time::timeout(timeout, newer).await {
            Ok(Some(list)) => Ok(list),
            _ => self.list(applicant_id).await,
        }
    }

    /// Sends one notification email. Failures are logged and reported as `false`.
    pub async fn email(&self, to: &str, sender: &str, message: &str) -> bool {
        let email = self.template.notification(to, sender, message);
        match self.mailer.send(email).await {
            Ok(()) => {
                tracing::info!(to = %to, "notification email sent");
                true
            }
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "notification email failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::store::ApplicantStore;
    use crate::models::applicant::NewApplicant;
    use crate::services::mail_service::MockMailer;

    fn template() -> MailTemplate {
        MailTemplate {
            subject: "Notifikasi Magang Radar Cirebon".into(),
            app_url: "http://localhost:3000/".into(),
        }
    }

    async fn seeded() -> (Arc<MemoryStore>, i32) {
        let store = Arc::new(MemoryStore::new());
        let applicant = store
            .insert_applicant(NewApplicant {
                name: "Budi".into(),
                email: "budi@test.id".into(),
                phone: "081234567890".into(),
                education_level: "SMK".into(),
                university_name: None,
                school_name: Some("SMKN 1 Cirebon".into()),
                study_program: None,
                major: Some("Multimedia".into()),
                semester: None,
                class_level: Some("XII".into()),
                position: "Desain Grafis".into(),
                file_name: "cv.pdf".into(),
                file_data: b"%PDF-1.4".to_vec(),
                user_id: None,
            })
            .await
            .unwrap();
        (store, applicant.id)
    }

    fn message(applicant_id: i32, text: &str) -> NewNotification {
        NewNotification {
            applicant_id,
            message: text.into(),
            sender: Some(DEFAULT_SENDER.into()),
        }
    }

    #[tokio::test]
    async fn dispatch_records_and_emails() {
        let (store, id) = seeded().await;
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.to == "budi@test.id" && email.html.contains("Wawancara Senin"))
            .times(1)
            .returning(|_| Ok(()));
        let service = NotificationService::new(store.clone(), Arc::new(mailer), template());

        let out = service.dispatch(message(id, "Wawancara Senin")).await.unwrap();
        assert!(out.email_sent);
        assert_eq!(out.notification.sender.as_deref(), Some("Admin"));
        assert_eq!(store.notification_count(id), 1);
    }

    #[tokio::test]
    async fn mail_failure_keeps_the_notification() {
        let (store, id) = seeded().await;
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::Mail("SMTP env not set".into())));
        let service = NotificationService::new(store.clone(), Arc::new(mailer), template());

        let out = service.dispatch(message(id, "Halo")).await.unwrap();
        assert!(!out.email_sent);
        assert_eq!(service.list(id).await.unwrap(), vec![out.notification]);
    }

    #[tokio::test]
    async fn unknown_applicant_is_not_found_and_sends_nothing() {
        let (store, _) = seeded().await;
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();
        let service = NotificationService::new(store, Arc::new(mailer), template());

        let err = service.dispatch(message(999, "Halo")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_list_for_quiet_applicant() {
        let (store, id) = seeded().await;
        let service = NotificationService::new(store, Arc::new(MockMailer::new()), template());
        assert!(service.list(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wait_returns_early_once_something_new_arrives() {
        let (store, id) = seeded().await;
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let service = NotificationService::new(store, Arc::new(mailer), template());

        let first = service.dispatch(message(id, "Pertama")).await.unwrap();
        let waiter = {
            let service = service.clone();
            let after = first.notification.id;
            tokio::spawn(async move { service.wait(id, Some(after), Duration::from_secs(10)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        service.dispatch(message(id, "Kedua")).await.unwrap();

        let list = waiter.await.unwrap().unwrap();
        assert_eq!(list[0].message, "Kedua");
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn wait_times_out_with_current_list() {
        let (store, id) = seeded().await;
        let service = NotificationService::new(store, Arc::new(MockMailer::new()), template());
        let list = service
            .wait(id, None, Duration::from_millis(50))
            .await
            .unwrap();
        assert!(list.is_empty());
    }
}
