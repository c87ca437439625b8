use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::postgres::{DUPLICATE_APPLICANT_EMAIL, DUPLICATE_USER_EMAIL};
use super::store::{ApplicantStore, HealthCheck, NotificationStore, ReviewStore, UserStore};
use crate::error::{Error, Result};
use crate::models::applicant::{
    Applicant, ApplicantFile, ApplicantStatus, ApplicantWithUser, NewApplicant,
};
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::{NewUser, PublicUser, User};

/// Process-local store with the same contract as `PgStore`. Backs the test suites.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    applicants: Vec<StoredApplicant>,
    notifications: Vec<Notification>,
    users: Vec<User>,
    next_applicant_id: i32,
    next_notification_id: i32,
    next_user_id: i32,
}

struct StoredApplicant {
    record: Applicant,
    file: ApplicantFile,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    /// Attaches a legacy external URL to an applicant, as older records carry.
    pub fn set_legacy_file_url(&self, applicant_id: i32, url: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let stored = inner
            .applicants
            .iter_mut()
            .find(|a| a.record.id == applicant_id)
            .ok_or_else(|| Error::NotFound("Pelamar tidak ditemukan".to_string()))?;
        stored.file.file_data = None;
        stored.file.file_url = Some(url.to_string());
        stored.record.has_file = false;
        stored.record.file_url = Some(url.to_string());
        Ok(())
    }

    pub fn notification_count(&self, applicant_id: i32) -> usize {
        self.lock()
            .map(|inner| {
                inner
                    .notifications
                    .iter()
                    .filter(|n| n.applicant_id == applicant_id)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Inner {
    fn push_notification(&mut self, new: NewNotification) -> Notification {
        self.next_notification_id += 1;
        let notification = Notification {
            id: self.next_notification_id,
            applicant_id: new.applicant_id,
            message: new.message,
            sender: new.sender,
            created_at: Utc::now(),
        };
        self.notifications.push(notification.clone());
        notification
    }
}

#[async_trait]
impl ApplicantStore for MemoryStore {
    async fn insert_applicant(&self, new: NewApplicant) -> Result<Applicant> {
        let mut inner = self.lock()?;
        if inner.applicants.iter().any(|a| a.record.email == new.email) {
            return Err(Error::Conflict(DUPLICATE_APPLICANT_EMAIL.to_string()));
        }
        inner.next_applicant_id += 1;
        let record = Applicant {
            id: inner.next_applicant_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            education_level: new.education_level,
            university_name: new.university_name,
            school_name: new.school_name,
            study_program: new.study_program,
            major: new.major,
            semester: new.semester,
            class_level: new.class_level,
            position: new.position,
            file_name: Some(new.file_name.clone()),
            file_url: None,
            has_file: !new.file_data.is_empty(),
            status: ApplicantStatus::Pending,
            created_at: Utc::now(),
            user_id: new.user_id,
        };
        inner.applicants.push(StoredApplicant {
            record: record.clone(),
            file: ApplicantFile {
                file_name: Some(new.file_name),
                file_data: Some(new.file_data),
                file_url: None,
            },
        });
        Ok(record)
    }

    async fn find_applicant(&self, id: i32) -> Result<Option<Applicant>> {
        let inner = self.lock()?;
        Ok(inner
            .applicants
            .iter()
            .find(|a| a.record.id == id)
            .map(|a| a.record.clone()))
    }

    async fn find_applicant_by_email(&self, email: &str) -> Result<Option<Applicant>> {
        let inner = self.lock()?;
        Ok(inner
            .applicants
            .iter()
            .find(|a| a.record.email == email)
            .map(|a| a.record.clone()))
    }

    async fn find_applicant_by_user(&self, user_id: i32) -> Result<Option<Applicant>> {
        let inner = self.lock()?;
        Ok(inner
            .applicants
            .iter()
            .rev()
            .find(|a| a.record.user_id == Some(user_id))
            .map(|a| a.record.clone()))
    }

    async fn find_applicant_file(&self, id: i32) -> Result<Option<ApplicantFile>> {
        let inner = self.lock()?;
        Ok(inner
            .applicants
            .iter()
            .find(|a| a.record.id == id)
            .map(|a| a.file.clone()))
    }

    async fn list_applicants(
        &self,
        status: Option<ApplicantStatus>,
    ) -> Result<Vec<ApplicantWithUser>> {
        let inner = self.lock()?;
        let mut list: Vec<ApplicantWithUser> = inner
            .applicants
            .iter()
            .filter(|a| status.map_or(true, |s| a.record.status == s))
            .map(|a| ApplicantWithUser {
                applicant: a.record.clone(),
                user: a
                    .record
                    .user_id
                    .and_then(|uid| inner.users.iter().find(|u| u.id == uid))
                    .cloned()
                    .map(PublicUser::from),
            })
            .collect();
        list.sort_by(|a, b| {
            b.applicant
                .created_at
                .cmp(&a.applicant.created_at)
                .then(b.applicant.id.cmp(&a.applicant.id))
        });
        Ok(list)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, new: NewNotification) -> Result<Notification> {
        let mut inner = self.lock()?;
        if !inner.applicants.iter().any(|a| a.record.id == new.applicant_id) {
            return Err(Error::Internal(format!(
                "notification references missing applicant {}",
                new.applicant_id
            )));
        }
        Ok(inner.push_notification(new))
    }

    async fn list_notifications(
        &self,
        applicant_id: i32,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let inner = self.lock()?;
        let mut list: Vec<Notification> = inner
            .notifications
            .iter()
            .filter(|n| n.applicant_id == applicant_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(list)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn transition(
        &self,
        applicant_id: i32,
        status: ApplicantStatus,
        new: NewNotification,
    ) -> Result<(Applicant, Notification)> {
        let mut inner = self.lock()?;
        let stored = inner
            .applicants
            .iter_mut()
            .find(|a| a.record.id == applicant_id)
            .ok_or_else(|| Error::NotFound("Pelamar tidak ditemukan".to_string()))?;
        stored.record.status = status;
        let applicant = stored.record.clone();
        let notification = inner.push_notification(NewNotification {
            applicant_id,
            ..new
        });
        Ok((applicant, notification))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(Error::Conflict(DUPLICATE_USER_EMAIL.to_string()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}
