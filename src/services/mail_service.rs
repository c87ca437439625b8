use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;
use crate::error::{Error, Result};
use crate::utils::validation::escape_html;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// SMTP delivery through a STARTTLS relay. Without credentials every send
/// fails, so callers decide whether that is fatal.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let (Some(user), Some(pass)) = (config.smtp_user.clone(), config.smtp_pass.clone()) else {
            tracing::warn!("SMTP credentials not set; outgoing email is disabled");
            return Ok(Self {
                transport: None,
                from: None,
            });
        };

        let from_raw = config.from.clone().unwrap_or_else(|| user.clone());
        let from: Mailbox = from_raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid MAIL_FROM '{}': {}", from_raw, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| Error::Config(format!("Invalid SMTP relay {}: {}", config.smtp_host, e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(user, pass))
            .build();

        tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer configured");
        Ok(Self {
            transport: Some(transport),
            from: Some(from),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            return Err(Error::Mail("SMTP env not set".to_string()));
        };

        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| Error::Mail(format!("Invalid recipient '{}': {}", email.to, e)))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| Error::Mail(format!("Failed to build message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| Error::Mail(format!("SMTP delivery failed: {}", e)))?;
        Ok(())
    }
}

/// Email template settings shared by every notification mail.
#[derive(Debug, Clone)]
pub struct MailTemplate {
    pub subject: String,
    pub app_url: String,
}

impl From<&MailConfig> for MailTemplate {
    fn from(config: &MailConfig) -> Self {
        Self {
            subject: config.subject.clone(),
            app_url: config.app_url.clone(),
        }
    }
}

impl MailTemplate {
    pub fn notification(&self, to: &str, sender: &str, message: &str) -> OutgoingEmail {
        let html = format!(
            r#"<h3>Notifikasi dari {sender}</h3>
<p>{message}</p>
<hr/>
<p>
  <a href="{url}" style="color:#2563eb; text-decoration:none; font-weight:bold;">
    Klik di sini untuk login ke website
  </a>
</p>"#,
            sender = escape_html(sender),
            message = escape_html(message),
            url = escape_html(&self.app_url),
        );
        OutgoingEmail {
            to: to.to_string(),
            subject: self.subject.clone(),
            html,
        }
    }
}
