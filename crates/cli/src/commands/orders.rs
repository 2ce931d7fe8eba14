//! `orders`, `export` and `health` commands.

use std::path::{Path, PathBuf};

use crate::client::{ApiClient, OrdersParams};

use super::{CommandError, FilterArgs, print_json};

/// Print the server's health report.
pub async fn health(client: &ApiClient) -> Result<(), CommandError> {
    print_json(&client.health().await?)
}

/// Print one page of orders, or every page with `all`.
pub async fn list(
    client: &ApiClient,
    filters: FilterArgs,
    limit: Option<u32>,
    after: Option<String>,
    all: bool,
) -> Result<(), CommandError> {
    let params = OrdersParams {
        limit,
        after,
        all: all.then_some(true),
        filters: filters.into(),
    };

    let response = client.orders(&params).await?;
    tracing::info!(total = %response["total"], "Fetched orders");
    print_json(&response)
}

/// Download a CSV export to `output`, or to the server-suggested filename.
pub async fn export(
    client: &ApiClient,
    filters: FilterArgs,
    output: Option<PathBuf>,
    first_page_only: bool,
) -> Result<(), CommandError> {
    let params = OrdersParams {
        all: first_page_only.then_some(false),
        filters: filters.into(),
        ..OrdersParams::default()
    };

    let download = client.export_csv(&params).await?;
    let path = output
        .or_else(|| download.filename.as_deref().and_then(local_file_name))
        .unwrap_or_else(|| PathBuf::from("orders.csv"));

    tokio::fs::write(&path, download.body.as_bytes()).await?;
    tracing::info!(path = %path.display(), bytes = download.body.len(), "CSV export saved");
    Ok(())
}

/// Final component of a server-suggested filename, so a download never
/// lands outside the working directory.
fn local_file_name(suggested: &str) -> Option<PathBuf> {
    Path::new(suggested).file_name().map(PathBuf::from)
}
