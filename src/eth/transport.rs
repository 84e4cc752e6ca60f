//! JSON-RPC transport capability and its HTTP implementation.

use crate::eth::error::{EthError, Result};
use alloy_provider::{Provider, ProviderBuilder};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::{borrow::Cow, fmt, sync::Arc};
use url::Url;

/// Capability to submit a single JSON-RPC call to a node.
///
/// Errors reported by the node come back as [`EthError::ProviderError`] carrying the
/// node's message unchanged.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Submit `method` with positional `params` and return the `result` member.
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// HTTP JSON-RPC transport backed by an alloy provider.
///
/// The underlying provider is built on the first call, so constructing a transport never
/// touches the network and never fails; a malformed URL surfaces on first use.
pub struct HttpTransport {
    url: String,
    provider: OnceCell<Arc<dyn Provider + Send + Sync>>,
}

impl HttpTransport {
    /// Create a transport for the given node URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), provider: OnceCell::new() }
    }

    /// The node URL this transport talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn provider(&self) -> Result<&Arc<dyn Provider + Send + Sync>> {
        self.provider.get_or_try_init(|| {
            let url = Url::parse(&self.url)
                .map_err(|e| EthError::ProviderError(format!("Invalid URL: {}", e)))?;

            tracing::debug!(url = %self.url, "Creating HTTP provider");
            let provider = ProviderBuilder::new().on_http(url);

            Ok(Arc::new(provider) as Arc<dyn Provider + Send + Sync>)
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("connected", &self.provider.get().is_some())
            .finish()
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let params = serde_json::value::to_raw_value(&params)?;

        let response = self
            .provider()?
            .raw_request_dyn(Cow::Owned(method.to_string()), &params)
            .await
            .map_err(|e| match e.as_error_resp() {
                Some(payload) => EthError::ProviderError(payload.message.to_string()),
                None => EthError::ProviderError(e.to_string()),
            })?;

        Ok(serde_json::from_str(response.get())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_does_not_validate_url() {
        let transport = HttpTransport::new("not a url");
        assert_eq!(transport.url(), "not a url");
    }

    #[tokio::test]
    async fn test_invalid_url_surfaces_on_first_call() {
        let transport = HttpTransport::new("not a url");
        let err = transport.call("eth_chainId", json!([])).await.unwrap_err();
        assert!(matches!(err, EthError::ProviderError(ref msg) if msg.starts_with("Invalid URL")));
    }
}
