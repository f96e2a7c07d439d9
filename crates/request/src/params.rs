//! Network parameters embedded in every composed operation.
//!
//! Fetch these immediately before composing: the validity window they carry is
//! measured in rounds from the moment they were read.

use serde::{Deserialize, Serialize};

/// Rounds an operation stays valid after `first_valid`.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1000;

/// Ledger response to a transaction-params query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    pub consensus_version: String,
    pub fee: u64,
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

/// Fee and validity window for one operation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Suggested fee from the ledger.
    pub fee: u64,
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: String,
}

impl NetworkParams {
    /// Fee each operation pays: the suggested fee, never below the minimum.
    pub fn required_fee(&self) -> u64 {
        self.fee.max(self.min_fee)
    }

    pub fn is_valid_at(&self, round: u64) -> bool {
        (self.first_valid..=self.last_valid).contains(&round)
    }
}

impl From<&TransactionParams> for NetworkParams {
    fn from(params: &TransactionParams) -> Self {
        Self {
            fee: params.fee,
            min_fee: params.min_fee,
            first_valid: params.last_round,
            last_valid: params.last_round.saturating_add(DEFAULT_VALIDITY_WINDOW),
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash.clone(),
        }
    }
}

impl From<TransactionParams> for NetworkParams {
    fn from(params: TransactionParams) -> Self {
        Self::from(&params)
    }
}
