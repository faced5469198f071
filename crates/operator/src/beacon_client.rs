//! Beacon node REST client.
//!
//! Only the standard `/eth/v1/beacon/headers/{block_id}` endpoint is used. A 404
//! from that endpoint means no canonical block exists for the id (a missed slot)
//! and is reported as `Ok(None)` rather than as an error.

use std::fmt;

use alloy::primitives::B256;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{OperatorError, Result},
    header::BeaconBlockHeader,
};

/// Identifier accepted by the beacon API in place of `{block_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Slot(u64),
    Head,
    Justified,
    Finalized,
    Genesis,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "{slot}"),
            Self::Head => f.write_str("head"),
            Self::Justified => f.write_str("justified"),
            Self::Finalized => f.write_str("finalized"),
            Self::Genesis => f.write_str("genesis"),
        }
    }
}

/// Read access to beacon block headers.
#[async_trait]
pub trait BeaconApi: Send + Sync {
    /// Fetches the header for `block_id`, or `None` when there is no canonical block.
    async fn header(&self, block_id: BlockId) -> Result<Option<BeaconBlockHeader>>;

    /// Slot of the latest finalized header.
    async fn finalized_slot(&self) -> Result<u64> {
        self.header(BlockId::Finalized)
            .await?
            .map(|header| header.slot)
            .ok_or(OperatorError::NoFinalizedHeader)
    }
}

#[derive(Debug, Deserialize)]
struct HeaderResponse {
    data: HeaderData,
}

#[derive(Debug, Deserialize)]
struct HeaderData {
    root: B256,
    header: SignedHeader,
}

#[derive(Debug, Deserialize)]
struct SignedHeader {
    message: BeaconBlockHeader,
}

/// HTTP implementation of [`BeaconApi`].
#[derive(Debug, Clone)]
pub struct BeaconClient {
    base_url: Url,
    client: reqwest::Client,
}

impl BeaconClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn header_url(&self, block_id: BlockId) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                OperatorError::Config(format!("beacon url {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(["eth", "v1", "beacon", "headers", block_id.to_string().as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl BeaconApi for BeaconClient {
    #[instrument(name = "beacon::header", skip_all, fields(%block_id))]
    async fn header(&self, block_id: BlockId) -> Result<Option<BeaconBlockHeader>> {
        let url = self.header_url(block_id)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("no canonical block");
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(OperatorError::BeaconStatus {
                    status: status.as_u16(),
                    block_id: block_id.to_string(),
                });
            }
            _ => {}
        }

        let body = response.bytes().await?;
        parse_header_response(block_id, &body).map(Some)
    }
}

/// Decodes a header response body and checks it against the requested id.
fn parse_header_response(block_id: BlockId, body: &[u8]) -> Result<BeaconBlockHeader> {
    let response: HeaderResponse = serde_json::from_slice(body)
        .map_err(|e| OperatorError::BeaconDecode(format!("header {block_id}: {e}")))?;
    let header = response.data.header.message;

    if let BlockId::Slot(slot) = block_id {
        if header.slot != slot {
            return Err(OperatorError::BeaconDecode(format!(
                "requested slot {slot}, node returned slot {}",
                header.slot
            )));
        }
    }

    let computed = header.hash_tree_root()?;
    if computed != response.data.root {
        return Err(OperatorError::BeaconDecode(format!(
            "header {block_id}: node root {} does not match computed root {computed}",
            response.data.root
        )));
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    const BODY: &str = r#"{
        "execution_optimistic": false,
        "finalized": true,
        "data": {
            "root": "0xfd6b385f95dd5e07f39f3e884830c7e6331406d7bcd9a01ea6b0968cc3a1fbe8",
            "canonical": true,
            "header": {
                "message": {
                    "slot": "1000",
                    "proposer_index": "7",
                    "parent_root": "0x1111111111111111111111111111111111111111111111111111111111111111",
                    "state_root": "0x2222222222222222222222222222222222222222222222222222222222222222",
                    "body_root": "0x3333333333333333333333333333333333333333333333333333333333333333"
                },
                "signature": "0x00"
            }
        }
    }"#;

    #[test]
    fn test_block_id_display() {
        assert_eq!(BlockId::Slot(123).to_string(), "123");
        assert_eq!(BlockId::Finalized.to_string(), "finalized");
        assert_eq!(BlockId::Head.to_string(), "head");
    }

    #[test]
    fn test_header_url() {
        let client = BeaconClient::new("http://localhost:5052".parse().unwrap());
        assert_eq!(
            client.header_url(BlockId::Slot(42)).unwrap().as_str(),
            "http://localhost:5052/eth/v1/beacon/headers/42"
        );

        let client = BeaconClient::new("https://beacon.example/node/".parse().unwrap());
        assert_eq!(
            client.header_url(BlockId::Finalized).unwrap().as_str(),
            "https://beacon.example/node/eth/v1/beacon/headers/finalized"
        );
    }

    #[test]
    fn test_parse_header_response() {
        let header = parse_header_response(BlockId::Slot(1000), BODY.as_bytes()).unwrap();
        assert_eq!(header.slot, 1000);
        assert_eq!(header.proposer_index, 7);

        let header = parse_header_response(BlockId::Finalized, BODY.as_bytes()).unwrap();
        assert_eq!(header.slot, 1000);
    }

    #[test]
    fn test_parse_rejects_slot_mismatch() {
        let err = parse_header_response(BlockId::Slot(999), BODY.as_bytes()).unwrap_err();
        assert!(matches!(err, OperatorError::BeaconDecode(_)));
    }

    #[test]
    fn test_parse_rejects_root_mismatch() {
        let body = BODY.replace(
            "0xfd6b385f95dd5e07f39f3e884830c7e6331406d7bcd9a01ea6b0968cc3a1fbe8",
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        );
        let err = parse_header_response(BlockId::Slot(1000), body.as_bytes()).unwrap_err();
        assert!(matches!(err, OperatorError::BeaconDecode(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_header_response(BlockId::Head, b"{\"code\":500}").unwrap_err();
        assert!(matches!(err, OperatorError::BeaconDecode(_)));
    }

    /// Answers a single request with `status` and `body`; yields the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap())
            .parse()
            .unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            let request = String::from_utf8_lossy(&request).into_owned();
            request.lines().next().unwrap_or_default().to_string()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_not_found_is_missed_slot() {
        let (url, server) = serve_once("404 Not Found", r#"{"code":404,"message":"NOT_FOUND"}"#).await;

        let header = BeaconClient::new(url).header(BlockId::Slot(5)).await.unwrap();

        assert_eq!(header, None);
        assert_eq!(
            server.await.unwrap(),
            "GET /eth/v1/beacon/headers/5 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_other_status_is_error() {
        let (url, _server) = serve_once("503 Service Unavailable", "").await;

        let err = BeaconClient::new(url)
            .header(BlockId::Slot(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OperatorError::BeaconStatus { status: 503, ref block_id } if block_id == "5"
        ));
    }

    #[tokio::test]
    async fn test_fetches_finalized_slot() {
        let (url, server) = serve_once("200 OK", BODY).await;

        let slot = BeaconClient::new(url).finalized_slot().await.unwrap();

        assert_eq!(slot, 1000);
        assert_eq!(
            server.await.unwrap(),
            "GET /eth/v1/beacon/headers/finalized HTTP/1.1"
        );
    }
}
