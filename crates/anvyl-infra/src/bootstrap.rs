//! First-run local host registration. Runs
//! once at startup; a later run finds the row already present via
//! `get_local_host` and does nothing.

use anvyl_db::hosts::NewHost;
use anvyl_db::Database;
use sysinfo::Networks;
use tracing::info;

use crate::error::InfraResult;

pub async fn ensure_local_host(db: &Database) -> InfraResult<String> {
    match db.get_local_host().await {
        Ok(host) => Ok(host.id),
        Err(anvyl_db::DbError::NotFound(_)) => {
            let name = hostname();
            let ip = first_non_loopback_ip();
            let os = std::env::consts::OS.to_string();

            let host = db
                .add_host(NewHost {
                    name,
                    ip,
                    os,
                    tags: vec![],
                    is_local: true,
                })
                .await?;

            info!(host_id = %host.id, ip = %host.ip, "registered local host");
            Ok(host.id)
        }
        Err(e) => Err(e.into()),
    }
}

fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string())
}

fn first_non_loopback_ip() -> String {
    let networks = Networks::new_with_refreshed_list();
    for (_, data) in networks.iter() {
        for ip_network in data.ip_networks() {
            let ip = ip_network.addr;
            if !ip.is_loopback() {
                return ip.to_string();
            }
        }
    }
    "127.0.0.1".to_string()
}
