// SPDX-License-Identifier: MIT
//! Network capability the pipeline depends on, and its adapters.

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

use crate::rpc::RpcClient;

/// Validate an RPC URL. Only http and https are allowed.
/// Rejects file://, ftp://, and other potentially dangerous schemes.
pub fn validate_rpc_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).context("failed to parse RPC URL")?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => bail!(
            "unsupported RPC URL scheme '{}'. Only http and https are allowed",
            scheme
        ),
    }
}

/// The only two facts the pipeline needs from a live network.
#[allow(async_fn_in_trait)]
pub trait NetworkProvider {
    /// Numeric chain id of the connected network.
    async fn resolve_network(&self) -> Result<u64>;

    /// Identity that will send the deploy transactions.
    async fn resolve_deployer(&self) -> Result<Address>;
}

/// Adapter over a JSON-RPC endpoint.
///
/// The deployer is either given explicitly or taken from the node's first
/// managed account.
pub struct RpcNetwork {
    client: RpcClient,
    deployer: Option<Address>,
}

impl RpcNetwork {
    pub fn connect(raw_url: &str, deployer: Option<Address>) -> Result<Self> {
        let url = validate_rpc_url(raw_url)?;
        Ok(RpcNetwork {
            client: RpcClient::new(url.as_str()),
            deployer,
        })
    }
}

impl NetworkProvider for RpcNetwork {
    async fn resolve_network(&self) -> Result<u64> {
        self.client
            .get_chain_id()
            .await
            .context("failed to resolve chain id")
    }

    async fn resolve_deployer(&self) -> Result<Address> {
        if let Some(deployer) = self.deployer {
            return Ok(deployer);
        }
        let accounts = self
            .client
            .get_accounts()
            .await
            .context("failed to resolve deployer from node accounts")?;
        let deployer = accounts
            .first()
            .copied()
            .context("node manages no accounts; pass --deployer")?;
        info!(%deployer, "Using node-managed deployer account");
        Ok(deployer)
    }
}

/// Fixed answers, for offline planning and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticNetwork {
    pub chain_id: u64,
    pub deployer: Address,
}

impl NetworkProvider for StaticNetwork {
    async fn resolve_network(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn resolve_deployer(&self) -> Result<Address> {
        Ok(self.deployer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        assert!(validate_rpc_url("https://rpc.gnosischain.com").is_ok());
    }

    #[test]
    fn test_accepts_http() {
        assert!(validate_rpc_url("http://localhost:8545").is_ok());
    }

    #[test]
    fn test_rejects_websocket_schemes() {
        assert!(validate_rpc_url("ws://localhost:8546").is_err());
        assert!(validate_rpc_url("wss://rpc.gnosischain.com/wss").is_err());
    }

    #[test]
    fn test_rejects_file_scheme() {
        assert!(validate_rpc_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(validate_rpc_url("not a url").is_err());
    }

    #[test]
    fn test_connect_rejects_bad_scheme() {
        assert!(RpcNetwork::connect("ftp://example.com", None).is_err());
    }

    #[tokio::test]
    async fn test_explicit_deployer_skips_rpc() {
        let deployer = Address::from([0x42u8; 20]);
        // Unroutable endpoint: the deployer must resolve without a request.
        let network = RpcNetwork::connect("http://127.0.0.1:9", Some(deployer)).unwrap();
        assert_eq!(network.resolve_deployer().await.unwrap(), deployer);
    }

    #[tokio::test]
    async fn test_static_network() {
        let network = StaticNetwork {
            chain_id: 100,
            deployer: Address::from([0x01u8; 20]),
        };
        assert_eq!(network.resolve_network().await.unwrap(), 100);
        assert_eq!(
            network.resolve_deployer().await.unwrap(),
            Address::from([0x01u8; 20])
        );
    }
}
