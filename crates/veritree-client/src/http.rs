//! HTTP transport: JSON over the log's write endpoints.
//!
//! Endpoints, relative to the base URL:
//! - `POST add-leaf`: body is the leaf statement. 200 means the leaf is
//!   sequenced, 202 means it is queued for the next merge, any 4xx is a
//!   permanent rejection whose body carries the reason.
//! - `GET tree-head`: the latest signed tree head plus cosignatures.
//! - `GET inclusion-proof/<tree_size>/<leaf_hash>`: 404 until the leaf
//!   is provable at that tree size.

use std::future::Future;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use veritree_core::model::{Cosignature, InclusionProof, SignedTreeHead};
use veritree_core::statement::LeafStatement;
use veritree_core::token::AuthToken;

use crate::error::TransportError;
use crate::transport::{AddLeafOutcome, LogTransport};
use crate::CLIENT_VERSION;

/// Header carrying the submit token, where the log rate-limits.
pub const TOKEN_HEADER: &str = "veritree-token";

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: Url,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct AddLeafRequest<'a> {
    statement: &'a LeafStatement,
}

#[derive(Debug, Deserialize)]
struct TreeHeadResponse {
    tree_head: SignedTreeHead,
    #[serde(default)]
    cosignatures: Vec<Cosignature>,
}

impl HttpTransport {
    /// Build a transport for the log at `base`. A trailing slash is
    /// appended to the base path if missing so endpoint joining keeps the
    /// full prefix.
    pub fn new(base: Url) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("veritree-client/{CLIENT_VERSION}"))
            .build()?;
        Ok(Self {
            base: ensure_trailing_slash(base),
            client,
        })
    }

    /// Build a transport reusing an existing reqwest client (connection
    /// pool sharing across submitters).
    pub fn with_client(base: Url, client: reqwest::Client) -> Self {
        Self {
            base: ensure_trailing_slash(base),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError::Url(format!("{path}: {e}")))
    }

    async fn add_leaf_impl(
        &self,
        statement: &LeafStatement,
        token: Option<&AuthToken>,
    ) -> Result<AddLeafOutcome, TransportError> {
        let url = self.endpoint("add-leaf")?;
        let mut req = self.client.post(url).json(&AddLeafRequest { statement });
        if let Some(token) = token {
            req = req.header(TOKEN_HEADER, token.to_header_value());
        }
        let resp = req.send().await?;
        match resp.status() {
            StatusCode::OK => Ok(AddLeafOutcome::Sequenced),
            StatusCode::ACCEPTED => Ok(AddLeafOutcome::Queued),
            status if status.is_client_error() => {
                let body = resp.text().await.unwrap_or_default();
                let reason = if body.is_empty() {
                    status.to_string()
                } else {
                    body
                };
                Err(TransportError::Rejected { reason })
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TransportError::Status {
                    code: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn latest_tree_head_impl(
        &self,
    ) -> Result<(SignedTreeHead, Vec<Cosignature>), TransportError> {
        let url = self.endpoint("tree-head")?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                code: status.as_u16(),
                body,
            });
        }
        let parsed: TreeHeadResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok((parsed.tree_head, parsed.cosignatures))
    }

    async fn inclusion_proof_impl(
        &self,
        tree_size: u64,
        leaf_hash: &[u8; 32],
    ) -> Result<Option<InclusionProof>, TransportError> {
        let path = format!("inclusion-proof/{tree_size}/{}", hex::encode(leaf_hash));
        let url = self.endpoint(&path)?;
        let resp = self.client.get(url).send().await?;
        match resp.status() {
            StatusCode::OK => {
                let proof: InclusionProof = resp
                    .json()
                    .await
                    .map_err(|e| TransportError::Decode(e.to_string()))?;
                Ok(Some(proof))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TransportError::Status {
                    code: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl LogTransport for HttpTransport {
    fn add_leaf(
        &self,
        statement: &LeafStatement,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<AddLeafOutcome, TransportError>> + Send {
        self.add_leaf_impl(statement, token)
    }

    fn latest_tree_head(
        &self,
    ) -> impl Future<Output = Result<(SignedTreeHead, Vec<Cosignature>), TransportError>> + Send
    {
        self.latest_tree_head_impl()
    }

    fn inclusion_proof(
        &self,
        tree_size: u64,
        leaf_hash: &[u8; 32],
    ) -> impl Future<Output = Result<Option<InclusionProof>, TransportError>> + Send {
        self.inclusion_proof_impl(tree_size, leaf_hash)
    }
}

fn ensure_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let base = Url::parse("https://log.example.org/v1").unwrap();
        let transport = HttpTransport::new(base).unwrap();
        assert_eq!(
            transport.endpoint("add-leaf").unwrap().as_str(),
            "https://log.example.org/v1/add-leaf"
        );
    }

    #[test]
    fn existing_trailing_slash_preserved() {
        let base = Url::parse("https://log.example.org/v1/").unwrap();
        let transport = HttpTransport::new(base).unwrap();
        assert_eq!(
            transport.endpoint("tree-head").unwrap().as_str(),
            "https://log.example.org/v1/tree-head"
        );
    }
}
