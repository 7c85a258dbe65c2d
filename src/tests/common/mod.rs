// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{routing::post, Form, Json};
use reqwest::Client;

use crate::config::settings::AuthorityConfig;
use crate::sources::authority::AuthorityClient;
use crate::TokenBroker;

pub const WINDOW: i64 = 1800;
pub const EXPIRES_ON: i64 = 2_000_000_000;
/// far enough from `EXPIRES_ON` that a cached token is served as is
pub const NOW_FRESH: i64 = EXPIRES_ON - 3600;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn authority_config(token_endpoint: String) -> AuthorityConfig {
    AuthorityConfig {
        token_endpoint,
        client_id: "test-client".to_owned(),
        resource: "https://org.crm.example.com".to_owned(),
        timeout_ms: 2000,
    }
}

pub fn broker_for(token_endpoint: String) -> TokenBroker {
    let authority = AuthorityClient::with_client(build_reqwest_client(), &authority_config(token_endpoint));
    TokenBroker::new(authority, WINDOW)
}

/// In-process token endpoint that records every submitted form and answers
/// grant number `n` (1-based) with `A{n}` / `R{n}` expiring at `EXPIRES_ON + n`.
pub struct FakeTokenEndpoint {
    pub url: String,
    pub forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub calls: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl FakeTokenEndpoint {
    pub async fn start() -> Self {
        let forms = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let router = Router::new().route("/oauth2/token", post({
            let forms = forms.clone();
            let calls = calls.clone();
            move |Form(form): Form<HashMap<String, String>>| {
                let forms = forms.clone();
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    forms.lock().unwrap().push(form);
                    Json(json!({
                        "token_type": "Bearer",
                        "access_token": format!("A{n}"),
                        "refresh_token": format!("R{n}"),
                        "expires_on": (EXPIRES_ON + n as i64).to_string(),
                    }))
                }
            }
        }));
        let (handle, addr) = spawn_axum(router).await;

        Self {
            url: format!("http://{}/oauth2/token", addr),
            forms,
            calls,
            handle,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn form(&self, index: usize) -> HashMap<String, String> {
        self.forms.lock().unwrap()[index].clone()
    }
}

impl Drop for FakeTokenEndpoint {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
