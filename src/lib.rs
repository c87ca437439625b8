pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::database::{postgres::PgStore, store::DynStore};
use crate::error::Result;
use crate::services::{
    applicant_service::ApplicantService,
    auth_service::AuthService,
    mail_service::{MailTemplate, Mailer, SmtpMailer},
    notification_service::NotificationService,
    review_service::ReviewService,
};
use crate::utils::token::TokenKeys;

/// Runtime knobs the services need, separated from `Config` so tests can
/// build them without touching the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub public_rps: u32,
    pub mail: MailTemplate,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
            max_upload_bytes: config.max_upload_bytes,
            public_rps: config.public_rps,
            mail: MailTemplate::from(&config.mail),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub settings: Arc<Settings>,
    pub applicant_service: ApplicantService,
    pub review_service: ReviewService,
    pub notification_service: NotificationService,
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let store: DynStore = Arc::new(PgStore::new(pool));
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::from_config(&config.mail)?);
        Ok(Self::with_parts(store, mailer, Settings::from(config)))
    }

    pub fn with_parts(store: DynStore, mailer: Arc<dyn Mailer>, settings: Settings) -> Self {
        let notification_service =
            NotificationService::new(store.clone(), mailer, settings.mail.clone());
        let review_service = ReviewService::new(store.clone(), notification_service.clone());
        let applicant_service = ApplicantService::new(store.clone(), settings.max_upload_bytes);
        let auth_service = AuthService::new(
            store.clone(),
            TokenKeys::new(&settings.jwt_secret, settings.token_ttl_hours),
        );

        Self {
            store,
            settings: Arc::new(settings),
            applicant_service,
            review_service,
            notification_service,
            auth_service,
        }
    }
}
