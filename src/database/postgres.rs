use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::store::{ApplicantStore, HealthCheck, NotificationStore, ReviewStore, UserStore};
use crate::error::{Error, Result};
use crate::models::applicant::{
    Applicant, ApplicantFile, ApplicantStatus, ApplicantWithUser, NewApplicant,
};
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::{NewUser, PublicUser, Role, User};

pub const DUPLICATE_APPLICANT_EMAIL: &str = "Email sudah mendaftar!";
pub const DUPLICATE_USER_EMAIL: &str = "Email sudah terdaftar!";

const APPLICANT_COLUMNS: &str = r#"
    a.id, a.name, a.email, a.phone, a.education_level, a.university_name, a.school_name,
    a.study_program, a.major, a.semester, a.class_level, a.position, a.file_name, a.file_url,
    (a.file_data IS NOT NULL AND octet_length(a.file_data) > 0) AS has_file,
    a.status, a.created_at, a.user_id
"#;

const NOTIFICATION_COLUMNS: &str = "id, applicant_id, message, sender, created_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(message.to_string())
        }
        _ => err.into(),
    }
}

#[derive(FromRow)]
struct ApplicantUserRow {
    #[sqlx(flatten)]
    applicant: Applicant,
    linked_user_id: Option<i32>,
    linked_user_name: Option<String>,
    linked_user_email: Option<String>,
    linked_user_role: Option<Role>,
}

impl From<ApplicantUserRow> for ApplicantWithUser {
    fn from(row: ApplicantUserRow) -> Self {
        let user = match (
            row.linked_user_id,
            row.linked_user_name,
            row.linked_user_email,
            row.linked_user_role,
        ) {
            (Some(id), Some(name), Some(email), Some(role)) => Some(PublicUser {
                id,
                name,
                email,
                role,
            }),
            _ => None,
        };
        Self {
            applicant: row.applicant,
            user,
        }
    }
}

#[async_trait]
impl ApplicantStore for PgStore {
    async fn insert_applicant(&self, new: NewApplicant) -> Result<Applicant> {
        let sql = format!(
            r#"
            WITH a AS (
                INSERT INTO applicants (
                    name, email, phone, education_level, university_name, school_name,
                    study_program, major, semester, class_level, position,
                    file_name, file_data, status, user_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'PENDING', $14)
                RETURNING *
            )
            SELECT {APPLICANT_COLUMNS} FROM a
            "#
        );
        sqlx::query_as::<_, Applicant>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.education_level)
            .bind(&new.university_name)
            .bind(&new.school_name)
            .bind(&new.study_program)
            .bind(&new.major)
            .bind(&new.semester)
            .bind(&new.class_level)
            .bind(&new.position)
            .bind(&new.file_name)
            .bind(&new.file_data)
            .bind(new.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_APPLICANT_EMAIL))
    }

    async fn find_applicant(&self, id: i32) -> Result<Option<Applicant>> {
        let sql = format!("SELECT {APPLICANT_COLUMNS} FROM applicants a WHERE a.id = $1");
        let applicant = sqlx::query_as::<_, Applicant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(applicant)
    }

    async fn find_applicant_by_email(&self, email: &str) -> Result<Option<Applicant>> {
        let sql = format!("SELECT {APPLICANT_COLUMNS} FROM applicants a WHERE a.email = $1");
        let applicant = sqlx::query_as::<_, Applicant>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(applicant)
    }

    async fn find_applicant_by_user(&self, user_id: i32) -> Result<Option<Applicant>> {
        let sql = format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants a WHERE a.user_id = $1 ORDER BY a.created_at DESC LIMIT 1"
        );
        let applicant = sqlx::query_as::<_, Applicant>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(applicant)
    }

    async fn find_applicant_file(&self, id: i32) -> Result<Option<ApplicantFile>> {
        let file = sqlx::query_as::<_, ApplicantFile>(
            "SELECT file_name, file_data, file_url FROM applicants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    async fn list_applicants(
        &self,
        status: Option<ApplicantStatus>,
    ) -> Result<Vec<ApplicantWithUser>> {
        let sql = format!(
            r#"
            SELECT {APPLICANT_COLUMNS},
                u.id AS linked_user_id, u.name AS linked_user_name,
                u.email AS linked_user_email, u.role AS linked_user_role
            FROM applicants a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::applicant_status IS NULL OR a.status = $1)
            ORDER BY a.created_at DESC, a.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, ApplicantUserRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ApplicantWithUser::from).collect())
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(&self, new: NewNotification) -> Result<Notification> {
        let sql = format!(
            "INSERT INTO notifications (applicant_id, message, sender) VALUES ($1, $2, $3) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(new.applicant_id)
            .bind(&new.message)
            .bind(&new.sender)
            .fetch_one(&self.pool)
            .await?;
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        applicant_id: i32,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE applicant_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(applicant_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn transition(
        &self,
        applicant_id: i32,
        status: ApplicantStatus,
        new: NewNotification,
    ) -> Result<(Applicant, Notification)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            WITH a AS (
                UPDATE applicants SET status = $1 WHERE id = $2 RETURNING *
            )
            SELECT {APPLICANT_COLUMNS} FROM a
            "#
        );
        let applicant = sqlx::query_as::<_, Applicant>(&sql)
            .bind(status)
            .bind(applicant_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Pelamar tidak ditemukan".to_string()))?;

        let sql = format!(
            "INSERT INTO notifications (applicant_id, message, sender) VALUES ($1, $2, $3) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(applicant_id)
            .bind(&new.message)
            .bind(&new.sender)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((applicant, notification))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_USER_EMAIL))
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
