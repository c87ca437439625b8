#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use internship_backend::{
    config::AdminSeed,
    database::memory::MemoryStore,
    error::{Error, Result},
    routes,
    services::mail_service::{MailTemplate, Mailer, OutgoingEmail},
    AppState, Settings,
};

pub const ADMIN_EMAIL: &str = "admin@radarcirebon.test";
pub const ADMIN_PASSWORD: &str = "admin-rahasia";
pub const BOUNDARY: &str = "----internship-test-boundary";

/// Keeps every email it is asked to send. Fails every send when `failing`.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub failing: bool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if self.failing {
            return Err(Error::Mail("connection refused".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn settings(public_rps: u32) -> Settings {
    Settings {
        jwt_secret: "test_secret_key".into(),
        token_ttl_hours: 1,
        max_upload_bytes: 5 * 1024 * 1024,
        public_rps,
        mail: MailTemplate {
            subject: "Notifikasi Magang Radar Cirebon".into(),
            app_url: "http://localhost:3000/".into(),
        },
    }
}

pub fn app_with(mailer: RecordingMailer, public_rps: u32) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(mailer);
    let state = AppState::with_parts(store.clone(), mailer.clone(), settings(public_rps));
    TestApp {
        router: routes::router(state.clone()),
        state,
        store,
        mailer,
    }
}

pub fn app() -> TestApp {
    app_with(RecordingMailer::default(), 1000)
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Reply {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: JsonValue) -> Reply {
        self.post_raw(uri, token, body.to_string()).await
    }

    /// Posts the body as-is with a JSON content type.
    pub async fn post_raw(&self, uri: &str, token: Option<&str>, body: impl Into<String>) -> Reply {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::from(body.into())).unwrap())
            .await
    }

    pub async fn apply(&self, form: &ApplyForm, token: Option<&str>) -> Reply {
        let mut req = Request::builder()
            .method("POST")
            .uri("/api/apply")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::from(form.encode())).unwrap()).await
    }

    pub async fn admin_token(&self) -> String {
        self.state
            .auth_service
            .ensure_admin(&AdminSeed {
                name: "Admin Radar".into(),
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap();
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn user_token(&self, email: &str) -> String {
        let reply = self
            .post_json(
                "/api/auth/register",
                None,
                json!({"name": "Pelamar", "email": email, "password": "rahasia123"}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
        self.login(email, "rahasia123").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let reply = self
            .post_json(
                "/api/auth/login",
                None,
                json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.text());
        reply.json()["token"].as_str().unwrap().to_string()
    }
}

/// Multipart application form, prefilled with a valid university applicant.
#[derive(Clone)]
pub struct ApplyForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<(String, String, Vec<u8>)>,
}

impl ApplyForm {
    pub fn budi() -> Self {
        Self::new("Budi", "budi@test.id", "081234567890")
    }

    pub fn new(name: &str, email: &str, phone: &str) -> Self {
        let fields = [
            ("name", name),
            ("email", email),
            ("phone", phone),
            ("educationLevel", "Mahasiswa"),
            ("universityName", "Universitas Swadaya Gunung Jati"),
            ("prodi", "Ilmu Komunikasi"),
            ("semester", "5"),
            ("radarCireubonPosition", "Reporter"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            fields,
            file: Some((
                "cv-budi.pdf".into(),
                "application/pdf".into(),
                b"%PDF-1.4\n% resume\n".to_vec(),
            )),
        }
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.fields.retain(|(k, _)| k != key);
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, name: &str, content_type: &str, data: &[u8]) -> Self {
        self.file = Some((name.into(), content_type.into(), data.to_vec()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (key, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{key}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, content_type, data)) = &self.file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
