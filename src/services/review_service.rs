use crate::database::store::{DynStore, ReviewStore};
use crate::dto::review_dto::StatusChange;
use crate::error::Result;
use crate::models::applicant::Applicant;
use crate::models::notification::{NewNotification, Notification, DEFAULT_SENDER};
use crate::services::notification_service::NotificationService;

pub const UPDATE_FAILED: &str = "Gagal memperbarui status";

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub applicant: Applicant,
    pub notification: Notification,
    /// `None` when no email was attempted.
    pub email_sent: Option<bool>,
}

/// Moves applicants between statuses and records the decision for them.
#[derive(Clone)]
pub struct ReviewService {
    store: DynStore,
    notifier: NotificationService,
}

impl ReviewService {
    pub fn new(store: DynStore, notifier: NotificationService) -> Self {
        Self { store, notifier }
    }

    /// Without a custom message the fixed decision text for the new status is
    /// recorded and nothing is emailed. A custom message is recorded under the
    /// admin sender and also emailed to the applicant.
    pub async fn update_status(&self, change: StatusChange) -> Result<StatusUpdate> {
        let (message, sender) = match &change.message {
            Some(custom) => (custom.clone(), Some(DEFAULT_SENDER.to_string())),
            None => (change.status.decision_message().to_string(), None),
        };

        let (applicant, notification) = self
            .store
            .transition(
                change.applicant_id,
                change.status,
                NewNotification {
                    applicant_id: change.applicant_id,
                    message,
                    sender,
                },
            )
            .await
            .map_err(|e| e.or_fail(UPDATE_FAILED))?;

        tracing::info!(
            applicant_id = applicant.id,
            status = %applicant.status,
            "applicant status updated"
        );

        let email_sent = match change.message {
            Some(_) => Some(
                self.notifier
                    .email(&applicant.email, DEFAULT_SENDER, &notification.message)
                    .await,
            ),
            None => None,
        };

        Ok(StatusUpdate {
            applicant,
            notification,
            email_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::store::{ApplicantStore, NotificationStore};
    use crate::error::Error;
    use crate::models::applicant::{ApplicantStatus, NewApplicant};
    use crate::services::mail_service::{MailTemplate, MockMailer};
    use std::sync::Arc;

    fn service(store: Arc<MemoryStore>, mailer: MockMailer) -> ReviewService {
        let template = MailTemplate {
            subject: "Notifikasi Magang Radar Cirebon".into(),
            app_url: "http://localhost:3000/".into(),
        };
        let notifier = NotificationService::new(store.clone(), Arc::new(mailer), template);
        ReviewService::new(store, notifier)
    }

    async fn budi(store: &MemoryStore) -> Applicant {
        store
            .insert_applicant(NewApplicant {
                name: "Budi".into(),
                email: "budi@test.id".into(),
                phone: "081234567890".into(),
                education_level: "Mahasiswa".into(),
                university_name: Some("UGJ".into()),
                school_name: None,
                study_program: Some("Informatika".into()),
                major: None,
                semester: Some("6".into()),
                class_level: None,
                position: "Reporter".into(),
                file_name: "cv.pdf".into(),
                file_data: b"%PDF-1.4".to_vec(),
                user_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn each_status_records_its_fixed_message() {
        for status in ApplicantStatus::ALL {
            let store = Arc::new(MemoryStore::new());
            let applicant = budi(&store).await;
            let mut mailer = MockMailer::new();
            mailer.expect_send().never();

            let update = service(store.clone(), mailer)
                .update_status(StatusChange {
                    applicant_id: applicant.id,
                    status,
                    message: None,
                })
                .await
                .unwrap();

            assert_eq!(update.applicant.status, status);
            assert_eq!(update.notification.message, status.decision_message());
            assert_eq!(update.email_sent, None);
            assert_eq!(store.notification_count(applicant.id), 1);
        }
    }

    #[tokio::test]
    async fn custom_message_is_recorded_and_emailed() {
        let store = Arc::new(MemoryStore::new());
        let applicant = budi(&store).await;
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.html.contains("Silakan datang hari Senin"))
            .times(1)
            .returning(|_| Err(Error::Mail("relay refused".into())));

        let update = service(store.clone(), mailer)
            .update_status(StatusChange {
                applicant_id: applicant.id,
                status: ApplicantStatus::Accepted,
                message: Some("Silakan datang hari Senin".into()),
            })
            .await
            .unwrap();

        assert_eq!(update.email_sent, Some(false));
        assert_eq!(update.notification.sender.as_deref(), Some("Admin"));
        let stored = store.list_notifications(applicant.id, 10).await.unwrap();
        assert_eq!(stored[0].message, "Silakan datang hari Senin");
    }

    #[tokio::test]
    async fn unknown_applicant_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let err = service(store, MockMailer::new())
            .update_status(StatusChange {
                applicant_id: 404,
                status: ApplicantStatus::Rejected,
                message: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
