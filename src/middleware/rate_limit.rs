use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{Error, Result};

const WINDOW: Duration = Duration::from_secs(1);
/// Stale client windows are swept once the table grows past this size.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window per client address.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    clients: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, client: &str, now: Instant) -> Result<bool> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| Error::Internal("rate limiter mutex poisoned".to_string()))?;

        if clients.len() > SWEEP_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.start) < WINDOW);
        }

        let window = clients.entry(client.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(window.start) >= WINDOW {
            window.start = now;
            window.count = 0;
        }
        if window.count < self.rps {
            window.count += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn client_key(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let client = client_key(&req);
    if !limiter.allow(&client, Instant::now())? {
        tracing::warn!(client = %client, path = %req.uri().path(), "rate limit exceeded");
        return Err(Error::RateLimited);
    }
    Ok(next.run(req).await)
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_per_client_and_resets() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        assert!(limiter.allow("10.0.0.1", t0).unwrap());
        assert!(limiter.allow("10.0.0.1", t0).unwrap());
        assert!(!limiter.allow("10.0.0.1", t0).unwrap());
        assert!(limiter.allow("10.0.0.2", t0).unwrap());
        assert!(limiter.allow("10.0.0.1", t0 + WINDOW).unwrap());
    }
}
