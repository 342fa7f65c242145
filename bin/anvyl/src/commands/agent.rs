use serde_json::json;

use crate::error::CliError;
use crate::infra_client::ApiClient;

pub async fn query(agent: &ApiClient, text: String, host_id: Option<String>) -> Result<(), CliError> {
    let body = json!({ "query": text, "host_id": host_id });
    let outcome = agent.post("/query", &body).await?;
    if let Some(reply) = outcome.get("reply").and_then(|v| v.as_str()) {
        println!("{reply}");
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
    }
    Ok(())
}
