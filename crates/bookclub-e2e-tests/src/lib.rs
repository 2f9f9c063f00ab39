use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use bookclub_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use tempfile::TempDir;
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    data_dir: TempDir,
}

impl ConfigGuard {
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }
}

pub fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let args = &[
        "bookclub-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub fn base_url(config: &ServerConfig) -> Url {
    Url::parse(&format!(
        "http://{}:{}",
        config.listen_address, config.port
    ))
    .expect("valid base url")
}

/// Starts the server in a background task and waits until its health
/// endpoint answers.
pub async fn spawn_server(config: ServerConfig) -> Result<reqwest::Client> {
    let url = base_url(&config);
    let state = bookclub_server::build_state(&config).await?;
    tokio::spawn(async move {
        // runs until the test process ends
        let never = std::future::pending::<()>();
        if let Err(e) = bookclub_server::run_graceful_with_state(config, state, never).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health = url.join("api/health")?;
    for _ in 0..50 {
        if let Ok(response) = client.get(health.clone()).send().await {
            if response.status().is_success() {
                return Ok(client);
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not become healthy"))
}
