// SPDX-License-Identifier: MIT
//! Minimal Ethereum JSON-RPC client.
//!
//! Only the identity calls the planner needs. Each call is a single request: a
//! failure aborts the run instead of being retried.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A minimal Ethereum JSON-RPC client.
#[derive(Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
    id: std::sync::Arc<AtomicU64>,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize, Debug)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
            id: std::sync::Arc::new(AtomicU64::new(1)),
        }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let id = self.id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, %id, "RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("RPC request to {} failed", method))?;

        if !response.status().is_success() {
            anyhow::bail!("RPC {} returned status {}", method, response.status());
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse RPC response for {}", method))?;

        if let Some(err) = body.error {
            anyhow::bail!(
                "RPC error for {}: {} (code {})",
                method,
                err.message,
                err.code
            );
        }

        body.result
            .with_context(|| format!("RPC response for {} has no result", method))
    }

    /// Get the chain ID.
    pub async fn get_chain_id(&self) -> Result<u64> {
        let result = self.call("eth_chainId", serde_json::json!([])).await?;
        let hex_str = result
            .as_str()
            .context("eth_chainId result is not a string")?;
        parse_hex_u64(hex_str).context("parse chain_id")
    }

    /// Accounts the node can sign for (node-managed signer).
    pub async fn get_accounts(&self) -> Result<Vec<Address>> {
        let result = self.call("eth_accounts", serde_json::json!([])).await?;
        result
            .as_array()
            .context("eth_accounts result is not an array")?
            .iter()
            .map(|v| {
                let s = v.as_str().context("eth_accounts item is not a string")?;
                parse_address(s).context("parse account")
            })
            .collect()
    }
}

// --- Hex parsing utilities ---

fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).with_context(|| format!("invalid hex u64: {s}"))
}

fn parse_address(s: &str) -> Result<Address> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes =
        alloy_primitives::hex::decode(s).with_context(|| format!("invalid hex address: {s}"))?;
    if bytes.len() != 20 {
        anyhow::bail!("Address must be 20 bytes, got {}", bytes.len());
    }
    Ok(Address::from_slice(&bytes))
}
