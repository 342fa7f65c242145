use anvyl_supervisor::{LogsOptions, ServiceId, ServiceStatus, StartOptions, Supervisor};

use crate::cli::ServiceAction;
use crate::error::CliError;

pub async fn up_all(supervisor: &Supervisor) -> Result<(), CliError> {
    supervisor.start_all(&StartOptions::default()).await?;
    println!("all services are up");
    Ok(())
}

pub fn down_all(supervisor: &Supervisor) -> Result<(), CliError> {
    supervisor.stop_all();
    println!("all services stopped");
    Ok(())
}

pub async fn restart_all(supervisor: &Supervisor) -> Result<(), CliError> {
    supervisor.stop_all();
    supervisor.start_all(&StartOptions::default()).await?;
    println!("all services restarted");
    Ok(())
}

pub fn status_all(supervisor: &Supervisor) -> Result<(), CliError> {
    let aggregate = supervisor.status_all();
    for status in &aggregate.services {
        print_status(&status.service.to_string(), status);
    }
    if !aggregate.all_running {
        return Err(CliError::not_running("not all services are running".to_string()));
    }
    Ok(())
}

pub async fn dispatch(supervisor: &Supervisor, service: ServiceId, action: ServiceAction) -> Result<(), CliError> {
    match action {
        ServiceAction::Up => {
            let pid = supervisor.start(service, &StartOptions::default())?;
            println!("{service} started, pid {pid}");
            Ok(())
        }
        ServiceAction::Down => {
            supervisor.stop(service)?;
            println!("{service} stopped");
            Ok(())
        }
        ServiceAction::Status => {
            let status = supervisor.status(service);
            print_status(&service.to_string(), &status);
            if !status.running {
                return Err(CliError::not_running(format!("{service} is not running")));
            }
            Ok(())
        }
        ServiceAction::Logs { follow, tail } => {
            if follow {
                let (tx, mut rx) = tokio::sync::mpsc::channel(64);
                for line in supervisor.logs(service, &LogsOptions { tail, follow: false }) {
                    println!("{line}");
                }
                tokio::select! {
                    result = supervisor.follow_logs(service, tx) => { result?; }
                    _ = async {
                        while let Some(line) = rx.recv().await {
                            println!("{line}");
                        }
                    } => {}
                }
            } else {
                for line in supervisor.logs(service, &LogsOptions { tail, follow: false }) {
                    println!("{line}");
                }
            }
            Ok(())
        }
    }
}

fn print_status(label: &str, status: &ServiceStatus) {
    if status.running {
        println!(
            "{label}: running (pid {}, uptime {}s, port {})",
            status.pid.unwrap_or_default(),
            status.uptime_seconds.unwrap_or_default(),
            status.port
        );
    } else {
        println!("{label}: not running (port {})", status.port);
    }
}
