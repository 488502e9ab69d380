use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{http::HeaderMap, routing::post, Json, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Token the stub authorization service maps to every permission.
pub const FULL_ACCESS_TOKEN: &str = "full-access";
/// Token that validates but carries no permissions.
pub const NO_ACCESS_TOKEN: &str = "no-access";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // The stub authorization service lives on its own runtime thread so it
        // outlives any single test's runtime.
        let auth_url = spawn_auth_service()?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/farmchain-api");
        cmd.env("FARMCHAIN_API_PORT", port.to_string())
            .env("AUTH_SERVICE_URL", auth_url)
            // Keep the lazy pool's acquire timeout short so startup and /health
            // fail fast (degraded) when no database is listening; a reachable
            // database still connects well within this bound.
            .env("DATABASE_ACQUIRE_TIMEOUT_SECS", "2")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // The server is up even when the database is degraded
                    if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// True when /health reports the database reachable. Tests that need the
/// store skip their assertions otherwise.
pub async fn db_available(server: &TestServer) -> Result<bool> {
    let res = reqwest::Client::new()
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    Ok(body["database"] == "ok")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn spawn_auth_service() -> Result<String> {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("auth stub runtime");

        rt.block_on(async move {
            let app = Router::new().route("/auth/public/validate", post(validate));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind auth stub");
            let addr = listener.local_addr().expect("auth stub addr");
            tx.send(addr).expect("report auth stub addr");
            axum::serve(listener, app).await.expect("auth stub");
        });
    });

    let addr = rx
        .recv_timeout(Duration::from_secs(5))
        .context("auth stub did not start")?;
    Ok(format!("http://{}", addr))
}

async fn validate(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    match token {
        FULL_ACCESS_TOKEN => (
            StatusCode::OK,
            Json(json!({
                "permissions": [
                    "CREATE_RECORD",
                    "VIEW_RECORD",
                    "CREATE_CONTRACT",
                    "UPDATE_CONTRACT",
                    "LOCK_PAYMENT",
                    "RELEASE_PAYMENT"
                ]
            })),
        ),
        NO_ACCESS_TOKEN => (StatusCode::OK, Json(json!({ "permissions": [] }))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid token" }))),
    }
}
