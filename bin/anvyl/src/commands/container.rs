use futures_util::StreamExt;
use serde_json::json;

use crate::cli::ContainerAction;
use crate::error::CliError;
use crate::infra_client::ApiClient;

pub async fn dispatch(infra: &ApiClient, base_url: &str, action: ContainerAction) -> Result<(), CliError> {
    match action {
        ContainerAction::List { host_id, all } => {
            let mut path = format!("/containers?all={all}");
            if let Some(host_id) = host_id {
                path.push_str(&format!("&host_id={host_id}"));
            }
            let containers = infra.get(&path).await?;
            println!("{}", serde_json::to_string_pretty(&containers).unwrap());
            Ok(())
        }
        ContainerAction::Create {
            name,
            image,
            host_id,
            ports,
            volumes,
            env,
        } => {
            let ports = ports
                .iter()
                .map(|p| parse_port(p))
                .collect::<Result<Vec<_>, _>>()?;
            let volumes = volumes
                .iter()
                .map(|v| parse_volume(v))
                .collect::<Result<Vec<_>, _>>()?;
            let environment = env
                .iter()
                .map(|e| parse_env(e))
                .collect::<Result<serde_json::Map<_, _>, _>>()?;

            let body = json!({
                "name": name,
                "image": image,
                "host_id": host_id,
                "ports": ports,
                "volumes": volumes,
                "environment": environment,
            });
            let container = infra.post("/containers", &body).await?;
            println!("{}", serde_json::to_string_pretty(&container).unwrap());
            Ok(())
        }
        ContainerAction::Stop { id, timeout } => {
            let body = json!({ "timeout": timeout });
            infra.post(&format!("/containers/{id}/stop"), &body).await?;
            println!("{id} stopped");
            Ok(())
        }
        ContainerAction::Logs { id, tail, follow } => {
            stream_logs(base_url, &id, tail.unwrap_or(100), follow).await
        }
        ContainerAction::Exec { id, command } => {
            let body = json!({ "command": command });
            let result = infra.post(&format!("/containers/{id}/exec"), &body).await?;
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
            Ok(())
        }
    }
}

fn parse_port(spec: &str) -> Result<serde_json::Value, CliError> {
    let (mapping, protocol) = spec.split_once('/').unwrap_or((spec, "tcp"));
    let (host_port, container_port) = mapping
        .split_once(':')
        .ok_or_else(|| CliError::invalid_arguments(format!("invalid --port \"{spec}\", expected HOST:CONTAINER[/PROTO]")))?;
    let host_port: u16 = host_port
        .parse()
        .map_err(|_| CliError::invalid_arguments(format!("invalid host port in \"{spec}\"")))?;
    let container_port: u16 = container_port
        .parse()
        .map_err(|_| CliError::invalid_arguments(format!("invalid container port in \"{spec}\"")))?;
    Ok(json!({
        "container_port": container_port,
        "host_port": host_port,
        "protocol": protocol,
    }))
}

fn parse_volume(spec: &str) -> Result<serde_json::Value, CliError> {
    let mut parts = spec.split(':');
    let source = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::invalid_arguments(format!("invalid --volume \"{spec}\", expected SOURCE:TARGET[:ro]")))?;
    let target = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::invalid_arguments(format!("invalid --volume \"{spec}\", expected SOURCE:TARGET[:ro]")))?;
    let read_only = parts.next() == Some("ro");
    Ok(json!({ "source": source, "target": target, "read_only": read_only }))
}

fn parse_env(spec: &str) -> Result<(String, serde_json::Value), CliError> {
    let (key, value) = spec
        .split_once('=')
        .ok_or_else(|| CliError::invalid_arguments(format!("invalid --env \"{spec}\", expected KEY=VALUE")))?;
    Ok((key.to_string(), json!(value)))
}

async fn stream_logs(base_url: &str, id: &str, tail: u32, follow: bool) -> Result<(), CliError> {
    let url = format!("{base_url}/containers/{id}/logs?tail={tail}&follow={follow}");
    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| CliError::backend_unavailable(format!("could not reach backend: {e}")))?;

    if !response.status().is_success() {
        return Err(CliError::generic(format!("log stream failed with status {}", response.status())));
    }

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CliError::generic(format!("log stream error: {e}")))?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(idx) = buffer.find("\n\n") {
            let frame = buffer[..idx].to_string();
            buffer.drain(..idx + 2);
            for line in frame.lines() {
                if let Some(data) = line.strip_prefix("data:") {
                    println!("{}", data.trim_start());
                }
            }
        }
    }
    Ok(())
}
