//! Ledger client seam.
//!
//! Supports pluggable submission backends via the [`LedgerClient`] trait. Includes
//! [`DryRunClient`], which signs and records groups locally instead of submitting.

use std::sync::{Mutex, PoisonError};

use oracle_codec::CodecError;
use oracle_crypto::{hash, verify_signature};
use thiserror::Error;
use tracing::info;

use crate::composer::OperationGroup;
use crate::params::NetworkParams;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Operation group rejected: {0}")]
    Rejected(String),
    #[error("Not confirmed within {0} rounds")]
    Timeout(u64),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Outcome of an executed group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResult {
    pub confirmed_round: u64,
    /// One identifier per operation, in group order.
    pub tx_ids: Vec<String>,
}

/// Submits composed groups to a ledger.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current fee and validity parameters. Call right before composing.
    async fn transaction_params(&self) -> Result<NetworkParams, ClientError>;

    /// Sign, submit and wait up to `wait_rounds` rounds for confirmation.
    async fn execute(
        &self,
        group: &OperationGroup,
        wait_rounds: u64,
    ) -> Result<ExecuteResult, ClientError>;
}

/// Client that validates, signs and records groups without touching the network.
pub struct DryRunClient {
    params: NetworkParams,
    executed: Mutex<Vec<OperationGroup>>,
}

impl DryRunClient {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// All recorded groups.
    pub fn executed(&self) -> Vec<OperationGroup> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn execution_count(&self) -> usize {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait::async_trait]
impl LedgerClient for DryRunClient {
    async fn transaction_params(&self) -> Result<NetworkParams, ClientError> {
        Ok(self.params.clone())
    }

    async fn execute(
        &self,
        group: &OperationGroup,
        wait_rounds: u64,
    ) -> Result<ExecuteResult, ClientError> {
        if group.is_empty() {
            return Err(ClientError::Rejected("empty operation group".into()));
        }

        let round = self.params.first_valid;
        let mut tx_ids = Vec::with_capacity(group.len());
        for call in group.calls() {
            if !call.network_params.is_valid_at(round) {
                return Err(ClientError::Rejected(format!(
                    "round {round} outside validity window [{}, {}]",
                    call.network_params.first_valid, call.network_params.last_valid
                )));
            }
            let payload = call.signing_payload()?;
            let signature = call.signer.sign(&payload);
            if !verify_signature(&call.sender, &payload, &signature) {
                return Err(ClientError::Rejected(format!(
                    "signature from {} does not verify for sender {}",
                    call.signer.address(),
                    call.sender
                )));
            }
            let mut signed = payload;
            signed.extend_from_slice(&signature);
            tx_ids.push(hex::encode(hash(&signed)));
        }

        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(group.clone());
        info!(
            operations = group.len(),
            wait_rounds,
            first_tx = %tx_ids[0],
            "dry-run: recorded operation group"
        );

        Ok(ExecuteResult {
            confirmed_round: round,
            tx_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use oracle_crypto::SigningKeypair;

    use crate::composer::{RequestComposer, RequestParams, RequestType};
    use crate::registry::SchemaRegistry;

    fn network_params(first_valid: u64) -> NetworkParams {
        NetworkParams {
            fee: 0,
            min_fee: 1000,
            first_valid,
            last_valid: first_valid + 1000,
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".into(),
        }
    }

    fn group(params: NetworkParams) -> OperationGroup {
        let keypair = SigningKeypair::from_secret_bytes(&[8u8; 32]);
        RequestComposer::new(SchemaRegistry::main_contract().unwrap())
            .build_request(RequestParams {
                app_id: 1,
                destination: vec![],
                request_args: vec![],
                request_type: RequestType::Classic,
                request_key: b"k".to_vec(),
                app_refs: vec![],
                asset_refs: vec![],
                account_refs: vec![],
                box_refs: vec![],
                sender: keypair.address(),
                signer: Arc::new(keypair),
                network_params: params,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_records_group() {
        let client = DryRunClient::new(network_params(500));
        let params = client.transaction_params().await.unwrap();
        let result = client.execute(&group(params), 5).await.unwrap();

        assert_eq!(result.confirmed_round, 500);
        assert_eq!(result.tx_ids.len(), 1);
        assert_eq!(result.tx_ids[0].len(), 64);
        assert_eq!(client.execution_count(), 1);
        assert_eq!(client.executed()[0].len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_is_deterministic() {
        let client = DryRunClient::new(network_params(500));
        let a = client.execute(&group(network_params(500)), 5).await.unwrap();
        let b = client.execute(&group(network_params(500)), 5).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_expired_params_rejected() {
        let client = DryRunClient::new(network_params(5000));
        let err = client.execute(&group(network_params(100)), 5).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
        assert_eq!(client.execution_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_signer_rejected() {
        let mut call = group(network_params(500)).calls()[0].clone();
        call.signer = Arc::new(SigningKeypair::from_secret_bytes(&[9u8; 32]));
        let mut forged = OperationGroup::new();
        forged.add_method_call(call).unwrap();

        let client = DryRunClient::new(network_params(500));
        let err = client.execute(&forged, 5).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
        assert_eq!(client.execution_count(), 0);
    }

    #[test]
    fn test_codec_errors_keep_their_kind() {
        let err = ClientError::from(CodecError::TruncatedData {
            needed: 8,
            available: 2,
        });
        assert!(matches!(
            err,
            ClientError::Codec(CodecError::TruncatedData { needed: 8, available: 2 })
        ));
        assert_eq!(err.to_string(), "Truncated data: needed 8 bytes, 2 available");
    }

    #[tokio::test]
    async fn test_empty_group_rejected() {
        let client = DryRunClient::new(network_params(1));
        let err = client.execute(&OperationGroup::new(), 5).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
    }
}
