use std::path::Path;

use anyhow::Context;
use tracing::instrument;
use typebridge_client::{HttpClient, SessionConfig};
use typebridge_model::{introspection, TypeModel};

use crate::args::IntrospectCommand;

pub(crate) async fn introspect(command: IntrospectCommand) -> anyhow::Result<()> {
    let response = fetch().await?;
    let json = serde_json::to_string_pretty(&response)?;

    match command.output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("could not write {}", path.display()))?;
            tracing::info!(path = %path.display(), "saved introspection response");
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Sends the introspection query to the engine of the current session.
#[instrument]
pub(crate) async fn fetch() -> anyhow::Result<serde_json::Value> {
    let session = SessionConfig::from_env().context("not running inside an engine session")?;
    let client = HttpClient::for_session(&session).into_dyn();

    let response = client
        .query(introspection::INTROSPECTION_QUERY)
        .await
        .context("introspection query failed")?;

    Ok(response)
}

/// Reads a saved introspection response, or queries the session when there is none.
pub(crate) async fn remote_schema(saved: Option<&Path>) -> anyhow::Result<TypeModel> {
    let json = match saved {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?,
        None => fetch().await?.to_string(),
    };

    introspection::parse(&json).context("invalid introspection response")
}
