//! HTTP client for the Safe transaction service.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::safe::transaction::{SafeSignature, SafeTransaction};
use crate::safe::types::MetaTransaction;
use crate::service::types::{
    EstimationRequest, EstimationResponse, ProposeTransactionBody, SafeTxDetails, ServiceError,
    ServiceResult,
};
use crate::service::CoordinationService;

pub struct SafeServiceClient {
    client: Client,
    base_url: String,
    origin: Option<String>,
}

impl SafeServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        url::Url::parse(base_url).map_err(|_| ServiceError::InvalidUrl(base_url.to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            origin: None,
        })
    }

    /// Tag proposals with an application origin string.
    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn expect_success(resp: Response) -> ServiceResult<String> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> ServiceResult<T> {
        let text = Self::expect_success(resp).await?;
        serde_json::from_str::<T>(&text).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CoordinationService for SafeServiceClient {
    async fn estimate_safe_tx(&self, safe: Address, tx: &MetaTransaction) -> ServiceResult<u64> {
        let resp = self
            .client
            .post(self.url(&format!("/safes/{}/multisig-transactions/estimations/", safe)))
            .json(&EstimationRequest::from(tx))
            .send()
            .await?;
        let estimation: EstimationResponse = Self::read_json(resp).await?;
        estimation
            .safe_tx_gas
            .parse()
            .map_err(|_| ServiceError::Decode(format!("safeTxGas '{}'", estimation.safe_tx_gas)))
    }

    async fn propose_tx(
        &self,
        safe: Address,
        safe_tx_hash: B256,
        tx: &SafeTransaction,
        signature: &SafeSignature,
    ) -> ServiceResult<()> {
        let body = ProposeTransactionBody::new(tx, safe_tx_hash, signature, self.origin.clone());
        let resp = self
            .client
            .post(self.url(&format!("/safes/{}/multisig-transactions/", safe)))
            .json(&body)
            .send()
            .await?;
        Self::expect_success(resp).await?;
        Ok(())
    }

    async fn get_safe_tx_details(&self, safe_tx_hash: B256) -> ServiceResult<SafeTxDetails> {
        let resp = self
            .client
            .get(self.url(&format!("/multisig-transactions/{}/", safe_tx_hash)))
            .send()
            .await?;
        Self::read_json(resp).await
    }
}

impl std::fmt::Debug for SafeServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeServiceClient")
            .field("base_url", &self.base_url)
            .field("origin", &self.origin)
            .finish()
    }
}
