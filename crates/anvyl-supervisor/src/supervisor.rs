//! Public supervisor operations.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncSeekExt};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{SupervisorError, SupervisorResult};
use crate::paths;
use crate::process;
use crate::types::{AggregateStatus, LogsOptions, ServiceId, ServiceStatus, StartOptions};

const STOP_GRACE: Duration = Duration::from_secs(10);
const HEALTH_DEADLINE: Duration = Duration::from_secs(30);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct Supervisor {
    http: reqwest::Client,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .expect("reqwest client"),
        }
    }

    pub fn start(&self, service: ServiceId, options: &StartOptions) -> SupervisorResult<u32> {
        if let Some(pid) = process::live_pid(service) {
            info!(%service, pid, "already running");
            return Ok(pid);
        }
        let pid = process::spawn_detached(service, options)?;
        info!(%service, pid, "started");
        Ok(pid)
    }

    pub fn stop(&self, service: ServiceId) -> SupervisorResult<()> {
        let Some(pid) = process::live_pid(service) else {
            process::remove_pid_file(service);
            return Ok(());
        };

        process::send_signal(pid, libc::SIGTERM).map_err(SupervisorError::Io)?;

        let deadline = std::time::Instant::now() + STOP_GRACE;
        while std::time::Instant::now() < deadline {
            if !process::is_alive(service, pid) {
                process::remove_pid_file(service);
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        warn!(%service, pid, "did not exit within grace period, sending SIGKILL");
        let _ = process::send_signal(pid, libc::SIGKILL);
        process::remove_pid_file(service);
        Ok(())
    }

    pub fn status(&self, service: ServiceId) -> ServiceStatus {
        match process::live_pid(service) {
            Some(pid) => ServiceStatus {
                service,
                running: true,
                pid: Some(pid),
                uptime_seconds: process::uptime_seconds(pid),
                port: default_port_env(service),
            },
            None => ServiceStatus {
                service,
                running: false,
                pid: None,
                uptime_seconds: None,
                port: default_port_env(service),
            },
        }
    }

    pub fn status_all(&self) -> AggregateStatus {
        let services: Vec<ServiceStatus> = ServiceId::ALL_STARTUP_ORDER
            .iter()
            .map(|s| self.status(*s))
            .collect();
        let all_running = services.iter().all(|s| s.running);
        AggregateStatus { services, all_running }
    }

    pub fn restart(&self, service: ServiceId, options: &StartOptions) -> SupervisorResult<u32> {
        self.stop(service)?;
        self.start(service, options)
    }

    pub async fn start_all(&self, options: &StartOptions) -> SupervisorResult<()> {
        let mut started_this_call = Vec::new();

        for service in ServiceId::ALL_STARTUP_ORDER {
            if let Err(e) = self.start(service, options) {
                self.rollback(&started_this_call);
                return Err(e);
            }
            started_this_call.push(service);

            if let Err(e) = self.wait_healthy(service).await {
                self.rollback(&started_this_call);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn stop_all(&self) {
        for service in ServiceId::shutdown_order() {
            let _ = self.stop(service);
        }
    }

    fn rollback(&self, started: &[ServiceId]) {
        for service in started.iter().rev() {
            let _ = self.stop(*service);
        }
    }

    async fn wait_healthy(&self, service: ServiceId) -> SupervisorResult<()> {
        let url = format!("http://localhost:{}/health", default_port_env(service));
        let deadline = std::time::Instant::now() + HEALTH_DEADLINE;

        loop {
            if let Ok(response) = self.http.get(&url).send().await {
                if response.status().is_success() {
                    return Ok(());
                }
            }
            if std::time::Instant::now() >= deadline {
                return Err(SupervisorError::HealthCheckTimeout {
                    service: service.as_str().to_string(),
                    seconds: HEALTH_DEADLINE.as_secs(),
                });
            }
            sleep(HEALTH_POLL_INTERVAL).await;
        }
    }

    pub fn logs(&self, service: ServiceId, options: &LogsOptions) -> Vec<String> {
        process::tail_lines(&paths::log_file(service), options.tail.unwrap_or(100))
    }

    /// Streams appended log lines until the channel closes, for
    /// `logs(service, {follow: true})`.
    pub async fn follow_logs(
        &self,
        service: ServiceId,
        tx: tokio::sync::mpsc::Sender<String>,
    ) -> SupervisorResult<()> {
        let path = paths::log_file(service);
        let mut file = tokio::fs::File::open(&path).await.map_err(SupervisorError::Io)?;
        file.seek(std::io::SeekFrom::End(0))
            .await
            .map_err(SupervisorError::Io)?;
        let mut reader = tokio::io::BufReader::new(file);

        loop {
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line).await.map_err(SupervisorError::Io)?;
            if bytes_read == 0 {
                sleep(Duration::from_millis(300)).await;
                continue;
            }
            if tx.send(line.trim_end().to_string()).await.is_err() {
                return Ok(());
            }
        }
    }
}

fn default_port_env(service: ServiceId) -> u16 {
    match service {
        ServiceId::Infra => anvyl_core::env_config::infra_port(),
        ServiceId::Mcp => anvyl_core::env_config::mcp_port(),
        ServiceId::Agent => anvyl_core::env_config::agent_port(),
    }
}
