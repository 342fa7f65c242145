use serde_json::json;

use crate::cli::HostAction;
use crate::error::CliError;
use crate::infra_client::ApiClient;

pub async fn dispatch(infra: &ApiClient, action: HostAction) -> Result<(), CliError> {
    match action {
        HostAction::List => {
            let hosts = infra.get("/hosts").await?;
            println!("{}", serde_json::to_string_pretty(&hosts).unwrap());
            Ok(())
        }
        HostAction::Add { name, ip, os } => {
            let body = json!({ "name": name, "ip": ip, "os": os });
            let host = infra.post("/hosts", &body).await?;
            println!("{}", serde_json::to_string_pretty(&host).unwrap());
            Ok(())
        }
        HostAction::Metrics { id } => {
            let metrics = infra.get(&format!("/hosts/{id}/metrics")).await?;
            println!("{}", serde_json::to_string_pretty(&metrics).unwrap());
            Ok(())
        }
    }
}
