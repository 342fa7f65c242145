//! Docker adapter: a narrow, typed surface over the Docker Engine, an
//! `Arc<Docker>` behind a cheaply `Clone` struct, plus the
//! `ContainerSpec`-to-`HostConfig` construction it needs to create
//! containers.

use std::collections::HashMap;
use std::sync::Arc;

use bollard::container::{
    Config, CreateContainerOptions, KillContainerOptions, ListContainersOptions, LogOutput,
    LogsOptions, RemoveContainerOptions, StartContainerOptions, StatsOptions,
    StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, Mount, MountTypeEnum, PortBinding};
use bollard::Docker;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{classify, DockerAdapterError, DockerAdapterResult};
use crate::types::{
    ContainerSpec, EngineContainerDetail, EngineContainerSummary, ExecResult, StatsSample,
    LABEL_MANAGED,
};

#[derive(Clone)]
pub struct DockerAdapter {
    client: Arc<Docker>,
}

impl DockerAdapter {
    pub fn connect() -> DockerAdapterResult<Self> {
        let client = Docker::connect_with_local_defaults().map_err(classify)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn connect_with_socket(path: &str) -> DockerAdapterResult<Self> {
        let client = Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION)
            .map_err(classify)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn ping(&self) -> bool {
        self.client.ping().await.is_ok()
    }

    pub async fn list_containers(&self, all: bool) -> DockerAdapterResult<Vec<EngineContainerSummary>> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        filters.insert("label".into(), vec![format!("{LABEL_MANAGED}=true")]);

        let options = ListContainersOptions::<String> {
            all,
            filters,
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(classify)?;

        Ok(summaries
            .into_iter()
            .filter_map(|c| {
                Some(EngineContainerSummary {
                    docker_id: c.id?,
                    names: c.names.unwrap_or_default(),
                    image: c.image.unwrap_or_default(),
                    state: c.state.unwrap_or_default(),
                    status: c.status.unwrap_or_default(),
                    labels: c.labels.unwrap_or_default(),
                })
            })
            .collect())
    }

    pub async fn inspect(&self, docker_id: &str) -> DockerAdapterResult<EngineContainerDetail> {
        let inspect = self
            .client
            .inspect_container(docker_id, None)
            .await
            .map_err(classify)?;

        let state = inspect.state.unwrap_or_default();
        let config = inspect.config.unwrap_or_default();

        Ok(EngineContainerDetail {
            docker_id: inspect.id.unwrap_or_default(),
            name: inspect.name.unwrap_or_default(),
            image: config.image.unwrap_or_default(),
            state: state.status.map(|s| s.to_string()).unwrap_or_default(),
            running: state.running.unwrap_or(false),
            started_at: parse_docker_time(state.started_at.as_deref()),
            finished_at: parse_docker_time(state.finished_at.as_deref()),
            exit_code: state.exit_code.map(|c| c as i32),
            labels: config.labels.unwrap_or_default(),
        })
    }

    pub async fn create_container(&self, spec: &ContainerSpec) -> DockerAdapterResult<String> {
        self.ensure_image(&spec.image).await?;

        let mut exposed_ports = HashMap::new();
        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        for port in &spec.ports {
            let key = format!("{}/{}", port.container_port, port.protocol);
            exposed_ports.insert(key.clone(), HashMap::new());
            if let Some(host_port) = port.host_port {
                port_bindings.insert(
                    key,
                    Some(vec![PortBinding {
                        host_ip: Some("0.0.0.0".to_string()),
                        host_port: Some(host_port.to_string()),
                    }]),
                );
            }
        }

        let mounts: Vec<Mount> = spec
            .volumes
            .iter()
            .map(|v| Mount {
                source: Some(v.source.clone()),
                target: Some(v.target.clone()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(v.read_only),
                ..Default::default()
            })
            .collect();

        let env: Vec<String> = spec
            .environment
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        let host_config = HostConfig {
            port_bindings: if port_bindings.is_empty() {
                None
            } else {
                Some(port_bindings)
            },
            mounts: if mounts.is_empty() { None } else { Some(mounts) },
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            env: if env.is_empty() { None } else { Some(env) },
            cmd: spec.command.clone(),
            labels: Some(spec.labels.clone()),
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let created = self
            .client
            .create_container(Some(options), config)
            .await
            .map_err(classify)?;

        self.client
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(classify)?;

        info!(docker_id = %created.id, name = %spec.name, "created and started container");
        Ok(created.id)
    }

    pub async fn start(&self, docker_id: &str) -> DockerAdapterResult<()> {
        self.client
            .start_container(docker_id, None::<StartContainerOptions<String>>)
            .await
            .map_err(classify)
    }

    pub async fn stop(&self, docker_id: &str, timeout_seconds: i64) -> DockerAdapterResult<()> {
        let options = StopContainerOptions { t: timeout_seconds };
        self.client
            .stop_container(docker_id, Some(options))
            .await
            .map_err(classify)
    }

    pub async fn kill(&self, docker_id: &str, signal: &str) -> DockerAdapterResult<()> {
        let options = KillContainerOptions { signal };
        self.client
            .kill_container(docker_id, Some(options))
            .await
            .map_err(classify)
    }

    pub async fn remove(&self, docker_id: &str, force: bool) -> DockerAdapterResult<()> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        self.client
            .remove_container(docker_id, Some(options))
            .await
            .map_err(classify)
    }

    /// Bounded (`follow=false`) or unbounded lazy (`follow=true`) stream
    /// of log lines, consumed by the HTTP layer's SSE writer.
    pub fn logs(
        &self,
        docker_id: &str,
        tail: u32,
        follow: bool,
    ) -> impl Stream<Item = DockerAdapterResult<String>> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow,
            tail: tail.to_string(),
            ..Default::default()
        };

        self.client.logs(docker_id, Some(options)).map(|item| {
            item.map(log_output_to_line).map_err(classify)
        })
    }

    pub async fn exec(
        &self,
        docker_id: &str,
        argv: Vec<String>,
        tty: bool,
    ) -> DockerAdapterResult<ExecResult> {
        let options = CreateExecOptions {
            cmd: Some(argv),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(tty),
            ..Default::default()
        };

        let exec = self
            .client
            .create_exec(docker_id, options)
            .await
            .map_err(classify)?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } = self
            .client
            .start_exec(&exec.id, None)
            .await
            .map_err(classify)?
        {
            while let Some(chunk) = output.next().await {
                match chunk.map_err(classify)? {
                    LogOutput::StdOut { message } | LogOutput::Console { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdIn { .. } => {}
                }
            }
        }

        let inspect = self
            .client
            .inspect_exec(&exec.id)
            .await
            .map_err(classify)?;

        Ok(ExecResult {
            exit_code: inspect.exit_code.unwrap_or(0),
            stdout,
            stderr,
        })
    }

    pub async fn stats(&self, docker_id: &str) -> DockerAdapterResult<StatsSample> {
        let options = StatsOptions {
            stream: false,
            one_shot: true,
        };

        let mut stream = self.client.stats(docker_id, Some(options));
        let sample = stream
            .next()
            .await
            .ok_or_else(|| DockerAdapterError::NotFound(docker_id.to_string()))?
            .map_err(classify)?;

        let memory_used = sample.memory_stats.usage.unwrap_or(0);
        let memory_limit = sample.memory_stats.limit.unwrap_or(0);

        let cpu_delta = sample
            .cpu_stats
            .cpu_usage
            .total_usage
            .saturating_sub(sample.precpu_stats.cpu_usage.total_usage);
        let system_delta = sample
            .cpu_stats
            .system_cpu_usage
            .unwrap_or(0)
            .saturating_sub(sample.precpu_stats.system_cpu_usage.unwrap_or(0));
        let online_cpus = sample.cpu_stats.online_cpus.unwrap_or(1).max(1) as f64;

        let cpu_percent = if system_delta > 0 {
            (cpu_delta as f64 / system_delta as f64) * online_cpus * 100.0
        } else {
            0.0
        };

        Ok(StatsSample {
            cpu_percent,
            memory_used_bytes: memory_used,
            memory_limit_bytes: memory_limit,
        })
    }

    async fn ensure_image(&self, image: &str) -> DockerAdapterResult<()> {
        if self.client.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        debug!(image, "pulling image");
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });

        let mut stream = self.client.create_image(options, None, None);
        while let Some(result) = stream.next().await {
            if let Err(e) = result {
                warn!(image, error = %e, "image pull failed");
                return Err(DockerAdapterError::InvalidSpec(format!(
                    "failed to pull image {image}: {e}"
                )));
            }
        }

        Ok(())
    }
}

fn log_output_to_line(output: LogOutput) -> String {
    match output {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::Console { message }
        | LogOutput::StdIn { message } => String::from_utf8_lossy(&message).trim_end().to_string(),
    }
}

fn parse_docker_time(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
        .filter(|_| !raw.starts_with("0001-01-01"))
}
