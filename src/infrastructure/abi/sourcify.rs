//! Contract ABI lookup from Sourcify, including proxy resolution

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::abi::{AbiSource, ResolvedAbi};

pub const DEFAULT_SOURCIFY_URL: &str = "https://sourcify.dev/server";

/// Sourcify v2 contract response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourcifyContract {
    #[serde(default)]
    abi: Option<serde_json::Value>,
    #[serde(default)]
    proxy_resolution: Option<ProxyResolution>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyResolution {
    #[serde(default)]
    is_proxy: bool,
    #[serde(default)]
    implementations: Vec<Implementation>,
}

#[derive(Debug, Deserialize)]
struct Implementation {
    address: Address,
}

/// ABI source backed by the Sourcify verified-contract repository
pub struct SourcifyAbiSource {
    http: reqwest::Client,
    base_url: String,
}

impl SourcifyAbiSource {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AbiSource for SourcifyAbiSource {
    async fn resolve_abi(&self, address: Address, chain_id: u64) -> Result<ResolvedAbi> {
        let url = format!(
            "{}/v2/contract/{}/{}?fields=abi,proxyResolution",
            self.base_url.trim_end_matches('/'),
            chain_id,
            address
        );
        debug!(%address, chain_id, "querying Sourcify");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query Sourcify")?;

        if !response.status().is_success() {
            bail!("Sourcify returned {} for {} on chain {}", response.status(), address, chain_id);
        }

        let contract: SourcifyContract = response
            .json()
            .await
            .context("Failed to parse Sourcify response")?;

        into_resolved(contract)
    }
}

fn into_resolved(contract: SourcifyContract) -> Result<ResolvedAbi> {
    let abi: JsonAbi = match contract.abi {
        Some(value) => serde_json::from_value(value).context("Sourcify returned a malformed ABI")?,
        None => bail!("Sourcify response carries no ABI"),
    };

    let proxy = contract.proxy_resolution.filter(|p| p.is_proxy);
    Ok(ResolvedAbi {
        abi,
        is_proxy: proxy.is_some(),
        implementation: proxy
            .and_then(|p| p.implementations.into_iter().next())
            .map(|implementation| implementation.address),
    })
}

/// ABI source that never resolves anything (offline mode)
pub struct NoAbiSource;

#[async_trait]
impl AbiSource for NoAbiSource {
    async fn resolve_abi(&self, address: Address, chain_id: u64) -> Result<ResolvedAbi> {
        bail!("no ABI source configured for {} on chain {}", address, chain_id)
    }
}
