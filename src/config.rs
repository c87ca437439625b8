use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub public_rps: u32,
    pub max_upload_bytes: usize,
    pub mail: MailConfig,
    pub admin_seed: Option<AdminSeed>,
    pub cors_origin: Option<String>,
    pub log_format: LogFormat,
}

/// SMTP relay settings. Credentials stay optional so the service can boot
/// without mail; delivery then fails per message and is logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub from: Option<String>,
    pub subject: String,
    pub app_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            from: None,
            subject: "Notifikasi Magang Radar Cirebon".to_string(),
            app_url: "http://localhost:3000/".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = MailConfig::default();
        let mail = MailConfig {
            smtp_host: get_env_or("SMTP_HOST", defaults.smtp_host),
            smtp_port: get_env_parse_or("SMTP_PORT", defaults.smtp_port)?,
            smtp_user: get_env_opt("SMTP_USER"),
            smtp_pass: get_env_opt("SMTP_PASS"),
            from: get_env_opt("MAIL_FROM"),
            subject: get_env_or("MAIL_SUBJECT", defaults.subject),
            app_url: get_env_or("APP_URL", defaults.app_url),
        };

        let admin_seed = match (get_env_opt("ADMIN_EMAIL"), get_env_opt("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                name: get_env_or("ADMIN_NAME", "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        let log_format = match get_env_opt("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080".to_string()),
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            token_ttl_hours: get_env_parse_or("TOKEN_TTL_HOURS", 24)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            mail,
            admin_seed,
            cors_origin: get_env_opt("CORS_ORIGIN"),
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: String) -> String {
    get_env_opt(name).unwrap_or(default)
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
