use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::applicant::{
    Applicant, ApplicantFile, ApplicantStatus, ApplicantWithUser, NewApplicant,
};
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::{NewUser, User};

#[async_trait]
pub trait ApplicantStore: Send + Sync {
    /// Fails with `Error::Conflict` when the email is already registered.
    async fn insert_applicant(&self, applicant: NewApplicant) -> Result<Applicant>;
    async fn find_applicant(&self, id: i32) -> Result<Option<Applicant>>;
    async fn find_applicant_by_email(&self, email: &str) -> Result<Option<Applicant>>;
    async fn find_applicant_by_user(&self, user_id: i32) -> Result<Option<Applicant>>;
    async fn find_applicant_file(&self, id: i32) -> Result<Option<ApplicantFile>>;
    /// Newest first, each with its linked account.
    async fn list_applicants(
        &self,
        status: Option<ApplicantStatus>,
    ) -> Result<Vec<ApplicantWithUser>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;
    /// Newest first, at most `limit` rows.
    async fn list_notifications(&self, applicant_id: i32, limit: i64)
        -> Result<Vec<Notification>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Sets the applicant's status and records the notification as one unit.
    /// Fails with `Error::NotFound` for an unknown id, in which case nothing is written.
    async fn transition(
        &self,
        applicant_id: i32,
        status: ApplicantStatus,
        notification: NewNotification,
    ) -> Result<(Applicant, Notification)>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Error::Conflict` when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn find_user(&self, id: i32) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

pub trait Store: ApplicantStore + NotificationStore + ReviewStore + UserStore + HealthCheck {}

impl<T> Store for T where T: ApplicantStore + NotificationStore + ReviewStore + UserStore + HealthCheck {}

pub type DynStore = Arc<dyn Store>;
