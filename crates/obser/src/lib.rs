// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Obser: authenticated client for the operations dashboard API.
//!
//! Every request carries the stored bearer token. A 401 triggers a single
//! shared token refresh; requests that fail while it runs wait for it and
//! are replayed with the new token.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod selection;
pub mod tls;

use crate::auth::persist::open_store;
use crate::client::ApiClient;
use crate::config::Config;
use crate::selection::SelectionStore;

/// Run one CLI command and print its JSON result to stdout.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = open_store(config.client.token_file.as_deref());
    let client = ApiClient::new(&config.client, store);
    let selection = SelectionStore::open(config.selection_file.as_deref());
    tracing::debug!(base_url = client.base_url(), "api client ready");

    let output = cli::execute(&client, &selection, config.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
