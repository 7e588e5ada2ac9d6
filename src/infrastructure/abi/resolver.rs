//! Remote selector resolution via OpenChain and 4byte.directory

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::abi::{AbiRegistry, SignatureResolver};

pub const DEFAULT_OPENCHAIN_URL: &str = "https://api.openchain.xyz";
pub const DEFAULT_FOURBYTE_URL: &str = "https://www.4byte.directory";

/// Build the shared HTTP client used by every remote resolver
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// OpenChain API response structures
#[derive(Debug, Deserialize)]
struct OpenChainResponse {
    ok: bool,
    result: OpenChainResult,
}

#[derive(Debug, Deserialize)]
struct OpenChainResult {
    #[serde(default)]
    function: HashMap<String, Option<Vec<OpenChainSignature>>>,
}

#[derive(Debug, Deserialize)]
struct OpenChainSignature {
    name: String,
}

/// Primary selector registry (the OpenChain signature database)
pub struct OpenChainResolver {
    http: reqwest::Client,
    base_url: String,
}

impl OpenChainResolver {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SignatureResolver for OpenChainResolver {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        let selector_hex = format!("0x{}", hex::encode(selector));
        let url = format!(
            "{}/signature-database/v1/lookup?function={}&filter=true",
            self.base_url.trim_end_matches('/'),
            selector_hex
        );
        debug!(selector = %selector_hex, "querying OpenChain");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query OpenChain API")?;

        if !response.status().is_success() {
            debug!(status = %response.status(), selector = %selector_hex, "OpenChain lookup failed");
            return Ok(Vec::new());
        }

        let data: OpenChainResponse = response
            .json()
            .await
            .context("Failed to parse OpenChain response")?;

        if !data.ok {
            return Ok(Vec::new());
        }

        Ok(data
            .result
            .function
            .get(&selector_hex)
            .and_then(|sigs| sigs.as_ref())
            .map(|sigs| sigs.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default())
    }
}

/// 4byte.directory API response structures
#[derive(Debug, Deserialize)]
struct FourByteResponse {
    results: Vec<FourByteSignature>,
}

#[derive(Debug, Deserialize)]
struct FourByteSignature {
    id: u64,
    text_signature: String,
}

/// Secondary selector registry (4byte.directory)
pub struct FourByteResolver {
    http: reqwest::Client,
    base_url: String,
}

impl FourByteResolver {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SignatureResolver for FourByteResolver {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/v1/signatures/?hex_signature=0x{}",
            self.base_url.trim_end_matches('/'),
            hex::encode(selector)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query 4byte.directory")?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let mut data: FourByteResponse = response
            .json()
            .await
            .context("Failed to parse 4byte.directory response")?;

        // Oldest submissions first; later collisions are usually spam
        data.results.sort_by_key(|sig| sig.id);
        Ok(data.results.into_iter().map(|sig| sig.text_signature).collect())
    }
}

/// Selector lookup against ABIs scanned from local build artifacts
pub struct LocalResolver {
    registry: AbiRegistry,
}

impl LocalResolver {
    pub fn new(registry: AbiRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SignatureResolver for LocalResolver {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        Ok(self
            .registry
            .lookup(selector)
            .map(|function| vec![function.signature.clone()])
            .unwrap_or_default())
    }
}

/// Consults `secondary` only when `primary` fails or knows nothing
pub struct FallbackResolver {
    primary: Arc<dyn SignatureResolver>,
    secondary: Arc<dyn SignatureResolver>,
}

impl FallbackResolver {
    pub fn new(primary: Arc<dyn SignatureResolver>, secondary: Arc<dyn SignatureResolver>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl SignatureResolver for FallbackResolver {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        match self.primary.resolve_selector(selector).await {
            Ok(candidates) if !candidates.is_empty() => return Ok(candidates),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "primary selector lookup failed"),
        }
        self.secondary.resolve_selector(selector).await
    }
}

/// Request-scoped memoization in front of any resolver
///
/// Failures are not cached so a later call may still succeed.
pub struct CachedResolver<R> {
    inner: R,
    cache: RwLock<HashMap<[u8; 4], Vec<String>>>,
}

impl<R: SignatureResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of memoized selectors
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl<R: SignatureResolver> SignatureResolver for CachedResolver<R> {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        if let Some(hit) = self.cache.read().await.get(&selector) {
            return Ok(hit.clone());
        }

        let candidates = self.inner.resolve_selector(selector).await?;
        self.cache.write().await.insert(selector, candidates.clone());
        Ok(candidates)
    }
}

/// Resolver that never knows anything (offline mode)
pub struct NoSignatures;

#[async_trait]
impl SignatureResolver for NoSignatures {
    async fn resolve_selector(&self, _selector: [u8; 4]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
